use crate::{
    config::OpenDataConfig,
    error::{NewsletterError, Result},
    open_data::models::{Dataset, Resource},
    table::{parse_table, Table, TableKind},
};
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;
use tracing::{debug, info};

/// Resource formats tried in order; the first one present wins
pub const PREFERRED_FORMATS: [&str; 3] = ["csv", "xlsx", "json"];

/// A dataset's metadata together with its parsed table, if any
#[derive(Debug, Clone)]
pub struct DatasetTable {
    pub dataset: Dataset,
    pub table: Option<Table>,
}

/// HTTP client for one open-data API root
pub struct OpenDataClient {
    client: Client,
    api_root: String,
    metadata_timeout: Duration,
    download_timeout: Duration,
}

impl OpenDataClient {
    pub fn new(config: &OpenDataConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut api_root = config.api_root.clone();
        if !api_root.ends_with('/') {
            api_root.push('/');
        }

        Ok(Self {
            client,
            api_root,
            metadata_timeout: Duration::from_secs(config.metadata_timeout_seconds),
            download_timeout: Duration::from_secs(config.download_timeout_seconds),
        })
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Fetch dataset metadata (`GET <api_root><slug>/`)
    pub async fn fetch_dataset(&self, slug: &str) -> Result<Dataset> {
        let url = format!("{}{}/", self.api_root, slug);
        debug!(url = %url, "Fetching dataset metadata");

        let response = self
            .client
            .get(&url)
            .timeout(self.metadata_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NewsletterError::Upstream {
                status: response.status(),
                url,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Download URL of the resource to read
    ///
    /// Preferred formats resolve to the API's stable `r/<id>` redirect; when
    /// none matches, the first resource's own URL is used. `None` when the
    /// dataset lists no resources.
    pub fn resource_url(&self, dataset: &Dataset) -> Result<Option<String>> {
        if let Some(best) = select_resource(&dataset.resources, &PREFERRED_FORMATS) {
            let id = best
                .id
                .as_deref()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| NewsletterError::MissingResourceUrl(best.label().to_string()))?;
            return Ok(Some(format!("{}r/{}", self.api_root, id)));
        }

        match dataset.resources.first() {
            Some(first) => first
                .url
                .clone()
                .filter(|u| !u.is_empty())
                .map(Some)
                .ok_or_else(|| NewsletterError::MissingResourceUrl(first.label().to_string())),
            None => Ok(None),
        }
    }

    /// Download a resource and parse it when it looks tabular
    pub async fn download_table(&self, url: &str) -> Result<Option<Table>> {
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NewsletterError::Upstream {
                status: response.status(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        let Some(kind) = TableKind::detect(&content_type, url) else {
            info!(url = %url, content_type = %content_type, "Resource is not tabular, skipping");
            return Ok(None);
        };

        let table = parse_table(kind, &body)?;
        debug!(
            url = %url,
            kind = ?kind,
            rows = table.row_count(),
            columns = table.columns().len(),
            "Parsed resource table"
        );
        Ok(Some(table))
    }

    /// Metadata plus the latest preferred resource, parsed
    pub async fn read_dataset_table(&self, slug: &str) -> Result<DatasetTable> {
        let dataset = self.fetch_dataset(slug).await?;

        let Some(url) = self.resource_url(&dataset)? else {
            info!(slug = %slug, "Dataset lists no resources");
            return Ok(DatasetTable {
                dataset,
                table: None,
            });
        };

        info!(slug = %slug, url = %url, "Downloading dataset resource");
        let table = self.download_table(&url).await?;

        Ok(DatasetTable { dataset, table })
    }
}

/// Most recently modified resource of the first preferred format present
///
/// Ties keep the earlier listed resource.
pub fn select_resource<'a>(resources: &'a [Resource], prefer: &[&str]) -> Option<&'a Resource> {
    prefer.iter().find_map(|format| {
        resources
            .iter()
            .filter(|r| r.format_lowercase() == *format)
            .fold(None, |best: Option<&'a Resource>, candidate| match best {
                Some(b) if b.freshness() >= candidate.freshness() => Some(b),
                _ => Some(candidate),
            })
    })
}
