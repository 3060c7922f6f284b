use serde::{Deserialize, Serialize};

/// Dataset metadata returned by `GET <api_root><slug>/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Dataset-level modification timestamp (ISO 8601, as published)
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// A downloadable file attached to a dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Absent on some listings; only required for the resource that is read
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    /// Direct URL, only used when no preferred format matches
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Resource {
    /// Identifier for messages, `"(no id)"` when unset
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("(no id)")
    }

    /// Lowercased format, empty when unset
    pub fn format_lowercase(&self) -> String {
        self.format.as_deref().unwrap_or_default().to_lowercase()
    }

    /// Timestamp used to rank resources of the same format
    pub fn freshness(&self) -> &str {
        self.last_modified
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.created_at.as_deref())
            .unwrap_or_default()
    }
}
