use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum NewsletterError {
    /// Configuration error (missing file, bad value, failed deserialization)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error, tagged with the path that failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request error (timeout, connection, redirect loop)
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Open-data API answered with a non-success status
    #[error("Upstream error ({status}) for {url}")]
    Upstream { status: StatusCode, url: String },

    /// Malformed JSON payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed CSV payload
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON document that cannot be read as a table
    #[error("Unsupported table layout: {0}")]
    TableShape(String),

    /// Fallback resource carries no download URL
    #[error("Resource {0} has no download URL")]
    MissingResourceUrl(String),
}

impl NewsletterError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<config::ConfigError> for NewsletterError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NewsletterError>;
