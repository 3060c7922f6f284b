use crate::{
    error::{NewsletterError, Result},
    markup,
};
use std::path::Path;

/// Rendered when no editorial text is available
pub const EDITO_PLACEHOLDER: &str = "<em>(Pas d’édito ce mois)</em>";

/// Read the optional editorial file; a missing or blank file yields `None`
pub async fn load_edito(path: &Path) -> Result<Option<String>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No editorial file");
            return Ok(None);
        }
        Err(e) => return Err(NewsletterError::io(path, e)),
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

/// Editorial HTML, or the placeholder when there is none
pub fn edito_html(edito: Option<&str>) -> String {
    match edito {
        Some(text) => markup::to_html(text),
        None => EDITO_PLACEHOLDER.to_string(),
    }
}
