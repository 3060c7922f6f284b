use crate::error::{NewsletterError, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_EDITO_PATH: &str = "data/edito.md";
pub const DEFAULT_TEMPLATE_PATH: &str = "templates/newsletter.html.j2";
pub const DEFAULT_OUTPUT_PATH: &str = "docs/index.html";

const ENV_PREFIX: &str = "NEWSLETTER";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_site_title")]
    pub site_title: String,
    #[serde(default = "default_brand_color")]
    pub brand_color: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
    /// label -> URL
    #[serde(default)]
    pub links: BTreeMap<String, String>,
    #[serde(default)]
    pub open_data: OpenDataConfig,
    /// IANA zone used for the generation timestamp
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// A content block of the newsletter body
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BlockConfig {
    pub title: String,
    /// Editorial markup, converted like the edito
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenDataConfig {
    /// Dataset API root, slugs are appended to it
    #[serde(default = "default_api_root")]
    pub api_root: String,
    #[serde(default = "default_metropole_slug")]
    pub metropole_slug: String,
    #[serde(default = "default_zni_slug")]
    pub zni_slug: String,
    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout_seconds: u64,
    #[serde(default = "default_download_timeout")]
    pub download_timeout_seconds: u64,
}

impl Default for OpenDataConfig {
    fn default() -> Self {
        Self {
            api_root: default_api_root(),
            metropole_slug: default_metropole_slug(),
            zni_slug: default_zni_slug(),
            metadata_timeout_seconds: default_metadata_timeout(),
            download_timeout_seconds: default_download_timeout(),
        }
    }
}

fn default_site_title() -> String {
    "Newsletter Echome Energies — Photovoltaïque".to_string()
}

fn default_brand_color() -> String {
    "#37C3AF".to_string()
}

fn default_text_color() -> String {
    "#1C1C1C".to_string()
}

fn default_timezone() -> String {
    "Europe/Paris".to_string()
}

fn default_api_root() -> String {
    "https://www.data.gouv.fr/api/1/datasets/".to_string()
}

fn default_metropole_slug() -> String {
    "arretes-tarifaires-photovoltaiques-en-metropole".to_string()
}

fn default_zni_slug() -> String {
    "arretes-tarifaires-photovoltaiques-en-zones-non-interconnectees-zni".to_string()
}

fn default_metadata_timeout() -> u64 {
    30
}

fn default_download_timeout() -> u64 {
    60
}

impl Config {
    /// Parsed timezone; `validate_config` guarantees it is known
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| NewsletterError::Config(format!("Invalid timezone '{}': {}", self.timezone, e)))
    }
}

/// Filesystem locations used by one run
#[derive(Debug, Clone)]
pub struct Paths {
    pub config: PathBuf,
    pub edito: PathBuf,
    pub template: PathBuf,
    pub output: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            edito: PathBuf::from(DEFAULT_EDITO_PATH),
            template: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    if !path.is_file() {
        return Err(NewsletterError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let yaml = std::fs::read_to_string(path).map_err(|e| NewsletterError::io(path, e))?;

    let settings = config::Config::builder()
        .add_source(config::File::from_str(&yaml, config::FileFormat::Yaml))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let mut cfg: Config = settings.try_deserialize()?;
    restore_link_labels(&mut cfg, &yaml)?;
    validate_config(&cfg)?;

    Ok(cfg)
}

/// Parse a YAML document without touching the filesystem or environment
pub fn parse_config(yaml: &str) -> Result<Config> {
    let settings = config::Config::builder()
        .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
        .build()?;

    let mut cfg: Config = settings.try_deserialize()?;
    restore_link_labels(&mut cfg, yaml)?;
    validate_config(&cfg)?;

    Ok(cfg)
}

#[derive(Deserialize)]
struct AuthoredLinks {
    #[serde(default)]
    links: Option<BTreeMap<String, String>>,
}

/// The `config` crate lowercases mapping keys; link labels are shown to
/// readers, so they are re-read from the document as written.
fn restore_link_labels(cfg: &mut Config, yaml: &str) -> Result<()> {
    if yaml.trim().is_empty() {
        return Ok(());
    }

    let authored: AuthoredLinks = serde_yaml::from_str(yaml)
        .map_err(|e| NewsletterError::Config(format!("Invalid links mapping: {}", e)))?;
    if let Some(links) = authored.links {
        cfg.links = links;
    }

    Ok(())
}

fn validate_config(cfg: &Config) -> Result<()> {
    for (name, value) in [("brand_color", &cfg.brand_color), ("text_color", &cfg.text_color)] {
        if !is_hex_color(value) {
            return Err(NewsletterError::Config(format!(
                "{} must be a #RGB or #RRGGBB color, got '{}'",
                name, value
            )));
        }
    }

    let root = &cfg.open_data.api_root;
    if !(root.starts_with("http://") || root.starts_with("https://")) {
        return Err(NewsletterError::Config(format!(
            "open_data.api_root must be an http(s) URL, got '{}'",
            root
        )));
    }

    if cfg.open_data.metropole_slug.trim().is_empty() || cfg.open_data.zni_slug.trim().is_empty() {
        return Err(NewsletterError::Config("Dataset slugs cannot be empty".to_string()));
    }

    if cfg.open_data.metadata_timeout_seconds == 0 || cfg.open_data.download_timeout_seconds == 0 {
        return Err(NewsletterError::Config("Timeouts must be greater than zero".to_string()));
    }

    for block in &cfg.blocks {
        if block.title.trim().is_empty() {
            return Err(NewsletterError::Config("Block title cannot be empty".to_string()));
        }
    }

    cfg.tz()?;

    Ok(())
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_apply_to_empty_mapping() {
        let cfg = parse_config("{}").unwrap();

        assert_eq!(cfg.site_title, "Newsletter Echome Energies — Photovoltaïque");
        assert_eq!(cfg.brand_color, "#37C3AF");
        assert_eq!(cfg.text_color, "#1C1C1C");
        assert!(cfg.blocks.is_empty());
        assert!(cfg.links.is_empty());
        assert_eq!(cfg.open_data.metadata_timeout_seconds, 30);
        assert_eq!(cfg.open_data.download_timeout_seconds, 60);
        assert_eq!(cfg.tz().unwrap(), chrono_tz::Europe::Paris);
    }

    #[test]
    fn test_blocks_and_links_are_read() {
        let yaml = r##"
site_title: "Lettre PV"
brand_color: "#123"
blocks:
  - title: "Actualité"
    body: "**Nouveau** tarif"
  - title: "Agenda"
    link: "https://example.com/agenda"
links:
  site: "https://echome.fr"
  contact: "mailto:contact@echome.fr"
"##;
        let cfg = parse_config(yaml).unwrap();

        assert_eq!(cfg.site_title, "Lettre PV");
        assert_eq!(cfg.brand_color, "#123");
        assert_eq!(cfg.blocks.len(), 2);
        assert_eq!(cfg.blocks[0].body, "**Nouveau** tarif");
        assert_eq!(cfg.blocks[1].body, "");
        assert_eq!(cfg.blocks[1].link.as_deref(), Some("https://example.com/agenda"));
        let labels: Vec<_> = cfg.links.keys().cloned().collect();
        assert_eq!(labels, vec!["contact", "site"]);
    }

    #[test]
    fn test_link_labels_keep_their_case() {
        let yaml = "links:\n  Site Web: \"https://echome.fr\"\n  Blog Echome: \"https://b\"\n";
        let cfg = parse_config(yaml).unwrap();

        assert_eq!(cfg.links.get("Site Web").map(String::as_str), Some("https://echome.fr"));
        assert_eq!(cfg.links.get("Blog Echome").map(String::as_str), Some("https://b"));
        assert!(!cfg.links.contains_key("site web"));
    }

    #[test]
    fn test_load_config_link_labels_reach_rendered_html() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "links:\n  Site Web: \"https://echome.fr\"").unwrap();

        let cfg = load_config(file.path()).unwrap();
        let html = crate::render::links_html(&cfg.links);
        assert!(html.contains("<a href='https://echome.fr' target='_blank'>Site Web</a>"));
    }

    #[test]
    fn test_validate_config_rejects_bad_color() {
        let result = parse_config("brand_color: teal");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("brand_color"));
    }

    #[test]
    fn test_validate_config_rejects_unknown_timezone() {
        let result = parse_config("timezone: Mars/Olympus");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid timezone"));
    }

    #[test]
    fn test_validate_config_rejects_zero_timeout() {
        let yaml = "open_data:\n  download_timeout_seconds: 0\n";
        assert!(parse_config(yaml).is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Path::new("/nonexistent/config.yaml"));
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "site_title: \"Depuis un fichier\"").unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.site_title, "Depuis un fichier");
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#abc"));
        assert!(is_hex_color("#37C3AF"));
        assert!(!is_hex_color("37C3AF"));
        assert!(!is_hex_color("#37C3A"));
        assert!(!is_hex_color("#zzzzzz"));
    }
}
