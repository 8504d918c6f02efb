mod dev_backend;

use std::sync::Arc;

use anyhow::{Context, Result};
use pdf_archive::{DocumentApi, PdfApiClient};

use crate::config::DeskConfig;

pub use dev_backend::{dev_document, DevBackend, RecordedEdit};

/// Pick the backend the config asks for: the in-memory dev data or the
/// real server.
pub fn connect(config: &DeskConfig) -> Result<Arc<dyn DocumentApi>> {
    if config.dev_mode {
        tracing::info!("using in-memory dev backend");
        return Ok(Arc::new(DevBackend::new()));
    }

    let client = PdfApiClient::new(&config.api_url, config.api_token.clone())
        .with_context(|| format!("Failed to create API client for {}", config.api_url))?;
    tracing::info!(api_url = %client.base_url(), "using remote document API");
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_rejects_bad_url() {
        let config = DeskConfig {
            api_url: "::nope::".to_string(),
            ..DeskConfig::default()
        };
        assert!(connect(&config).is_err());
    }

    #[test]
    fn connect_builds_http_client() {
        let config = DeskConfig::default();
        assert!(connect(&config).is_ok());
    }
}
