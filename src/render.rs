//! Template rendering and output
//!
//! Templates are plain HTML with `{{ name }}` placeholders. Values are
//! inserted verbatim (no escaping); placeholders with no value render empty.

use crate::{
    config::{BlockConfig, Config},
    error::{NewsletterError, Result},
    markup,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

/// Rendered for a dataset whose modification date is unknown
pub const UNKNOWN_DATE: &str = "inconnue";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Placeholder names a template may use
pub const KNOWN_PLACEHOLDERS: [&str; 10] = [
    "site_title",
    "brand_color",
    "text_color",
    "blocks",
    "links",
    "now_paris",
    "edito_html",
    "cre_last_metro",
    "cre_last_zni",
    "chiffre_mois",
];

/// Every value the template can reference
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub site_title: String,
    pub brand_color: String,
    pub text_color: String,
    pub blocks_html: String,
    pub links_html: String,
    pub now: String,
    pub edito_html: String,
    pub cre_last_metro: Option<String>,
    pub cre_last_zni: Option<String>,
    pub chiffre_mois: String,
}

impl RenderContext {
    pub fn new(
        cfg: &Config,
        now: String,
        edito_html: String,
        cre_last_metro: Option<String>,
        cre_last_zni: Option<String>,
        chiffre_mois: String,
    ) -> Self {
        Self {
            site_title: cfg.site_title.clone(),
            brand_color: cfg.brand_color.clone(),
            text_color: cfg.text_color.clone(),
            blocks_html: blocks_html(&cfg.blocks),
            links_html: links_html(&cfg.links),
            now,
            edito_html,
            cre_last_metro,
            cre_last_zni,
            chiffre_mois,
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        let value = match name {
            "site_title" => &self.site_title,
            "brand_color" => &self.brand_color,
            "text_color" => &self.text_color,
            "blocks" => &self.blocks_html,
            "links" => &self.links_html,
            "now_paris" => &self.now,
            "edito_html" => &self.edito_html,
            "cre_last_metro" => return Some(self.cre_last_metro.as_deref().unwrap_or(UNKNOWN_DATE)),
            "cre_last_zni" => return Some(self.cre_last_zni.as_deref().unwrap_or(UNKNOWN_DATE)),
            "chiffre_mois" => &self.chiffre_mois,
            _ => return None,
        };
        Some(value.as_str())
    }
}

pub async fn load_template(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| NewsletterError::io(path, e))
}

/// Substitute every placeholder of `template`
pub fn render(template: &str, ctx: &RenderContext) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            match ctx.lookup(name) {
                Some(value) => value.to_string(),
                None => {
                    tracing::debug!(placeholder = %name, "Unknown template placeholder");
                    String::new()
                }
            }
        })
        .into_owned()
}

/// Distinct placeholder names in order of first use
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

pub fn is_known_placeholder(name: &str) -> bool {
    KNOWN_PLACEHOLDERS.iter().any(|known| *known == name)
}

/// One `<section>` per configured block
pub fn blocks_html(blocks: &[BlockConfig]) -> String {
    blocks
        .iter()
        .map(|block| {
            let mut html = format!("<section class=\"block\">\n<h2>{}</h2>\n", block.title);
            if !block.body.is_empty() {
                html.push_str(&format!("<p>{}</p>\n", markup::to_html(&block.body)));
            }
            if let Some(link) = &block.link {
                html.push_str(&format!(
                    "<p><a href='{}' target='_blank'>En savoir plus</a></p>\n",
                    link
                ));
            }
            html.push_str("</section>");
            html
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Link list, empty when no links are configured
pub fn links_html(links: &BTreeMap<String, String>) -> String {
    if links.is_empty() {
        return String::new();
    }

    let items: String = links
        .iter()
        .map(|(label, url)| format!("<li><a href='{}' target='_blank'>{}</a></li>\n", url, label))
        .collect();
    format!("<ul class=\"links\">\n{}</ul>", items)
}

/// Civil time of `instant` in `tz`, minute precision
pub fn format_timestamp(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(TIMESTAMP_FORMAT).to_string()
}

/// Write `html` to `path` through a sibling temporary file
///
/// Parent directories are created; the previous document is replaced by a
/// rename so readers never observe a partial file.
pub async fn write_output(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| NewsletterError::io(parent, e))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    if let Err(e) = tokio::fs::write(&tmp_path, html).await {
        discard_tmp(&tmp_path).await;
        return Err(NewsletterError::io(&tmp_path, e));
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        discard_tmp(&tmp_path).await;
        return Err(NewsletterError::io(path, e));
    }

    Ok(())
}

async fn discard_tmp(tmp_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(tmp_path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %tmp_path.display(), error = %e, "Failed to remove temporary output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use chrono::TimeZone;

    fn context() -> RenderContext {
        let cfg = parse_config("site_title: \"Lettre\"").unwrap();
        RenderContext::new(
            &cfg,
            "2024-07-01 14:30".to_string(),
            "<em>edito</em>".to_string(),
            Some("2024-06-30T08:00:00".to_string()),
            None,
            "7.5 c€/kWh".to_string(),
        )
    }

    #[test]
    fn test_render_substitutes_known_placeholders() {
        let template = "<h1 style=\"color:{{brand_color}}\">{{ site_title }}</h1>{{ edito_html }}|{{chiffre_mois}}|{{ now_paris }}";
        assert_eq!(
            render(template, &context()),
            "<h1 style=\"color:#37C3AF\">Lettre</h1><em>edito</em>|7.5 c€/kWh|2024-07-01 14:30"
        );
    }

    #[test]
    fn test_render_missing_dates_and_unknown_names() {
        let template = "{{ cre_last_metro }}/{{ cre_last_zni }}/{{ nope }}/{ single }";
        assert_eq!(render(template, &context()), "2024-06-30T08:00:00/inconnue//{ single }");
    }

    #[test]
    fn test_placeholders_are_listed_once() {
        let names = placeholders("{{ site_title }}{{links}}{{ site_title }}{{ extra }}");
        assert_eq!(names, vec!["site_title", "links", "extra"]);
        assert!(is_known_placeholder("links"));
        assert!(!is_known_placeholder("extra"));
    }

    #[test]
    fn test_every_known_placeholder_has_a_value() {
        let ctx = context();
        for name in KNOWN_PLACEHOLDERS {
            assert!(ctx.lookup(name).is_some(), "{} has no value", name);
        }
    }

    #[test]
    fn test_blocks_html() {
        let blocks = vec![
            BlockConfig {
                title: "Actualité".to_string(),
                body: "**Nouveau**".to_string(),
                link: None,
            },
            BlockConfig {
                title: "Agenda".to_string(),
                body: String::new(),
                link: Some("https://example.com".to_string()),
            },
        ];

        let html = blocks_html(&blocks);
        assert!(html.contains("<h2>Actualité</h2>\n<p><strong>Nouveau</strong></p>"));
        assert!(html.contains("<a href='https://example.com' target='_blank'>En savoir plus</a>"));
        assert_eq!(html.matches("<section").count(), 2);
        assert_eq!(blocks_html(&[]), "");
    }

    #[test]
    fn test_links_html() {
        let mut links = BTreeMap::new();
        links.insert("site".to_string(), "https://echome.fr".to_string());
        links.insert("blog".to_string(), "https://echome.fr/blog".to_string());

        let html = links_html(&links);
        let blog = html.find("blog").unwrap();
        let site = html.find(">site<").unwrap();
        assert!(blog < site);
        assert!(html.starts_with("<ul class=\"links\">"));
        assert_eq!(links_html(&BTreeMap::new()), "");
    }

    #[test]
    fn test_format_timestamp_uses_civil_time() {
        let summer = Utc.with_ymd_and_hms(2024, 7, 1, 12, 30, 0).unwrap();
        let winter = Utc.with_ymd_and_hms(2024, 1, 15, 23, 5, 0).unwrap();

        assert_eq!(format_timestamp(summer, chrono_tz::Europe::Paris), "2024-07-01 14:30");
        assert_eq!(format_timestamp(winter, chrono_tz::Europe::Paris), "2024-01-16 00:05");
    }

    #[tokio::test]
    async fn test_write_output_creates_dirs_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs").join("index.html");

        write_output(&path, "<p>v1</p>").await.unwrap();
        write_output(&path, "<p>v2</p>").await.unwrap();

        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "<p>v2</p>");
        assert!(!dir.path().join("docs").join("index.html.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs").join("index.html");
        tokio::fs::create_dir_all(&path).await.unwrap();
        tokio::fs::write(path.join("keep.txt"), "x").await.unwrap();

        let result = write_output(&path, "<p>new</p>").await;

        assert!(matches!(result, Err(NewsletterError::Io { .. })));
        assert!(!dir.path().join("docs").join("index.html.tmp").exists());
        assert!(path.join("keep.txt").exists());
    }
}
