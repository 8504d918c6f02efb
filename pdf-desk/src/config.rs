use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const API_URL_ENV: &str = "PDF_DESK_API_URL";
const API_TOKEN_ENV: &str = "PDF_DESK_API_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskConfig {
    /// Base URL of the document API, e.g. "http://localhost:5513"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Rows per listing page. Fixed for the session.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Seconds a cached listing page is served without refetching.
    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: u64,
    /// Use the in-memory dev backend instead of the server.
    #[serde(default)]
    pub dev_mode: bool,
}

fn default_api_url() -> String {
    "http://localhost:5513".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_freshness_secs() -> u64 {
    10
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: None,
            page_size: default_page_size(),
            freshness_secs: default_freshness_secs(),
            dev_mode: false,
        }
    }
}

impl DeskConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("pdf-desk")
            .join("config.toml"))
    }

    /// Load config from the default location, then apply `.env.desk` and
    /// environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::from_filename(".env.desk").ok();
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_env_overrides())
    }

    /// Load config from `path`. Returns default config if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        Ok(())
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = url;
            }
        }
        if let Ok(token) = std::env::var(API_TOKEN_ENV) {
            self.api_token = Some(token).filter(|t| !t.trim().is_empty());
        }
        self
    }

    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.page_size > 0, "page_size must be at least 1");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DeskConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, DeskConfig::default());
        assert_eq!(config.freshness(), Duration::from_secs(10));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = \"https://pdfs.example.com\"\ndev_mode = true\n").unwrap();

        let config = DeskConfig::load_from(&path).unwrap();
        assert_eq!(config.api_url, "https://pdfs.example.com");
        assert!(config.dev_mode);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = DeskConfig {
            api_token: Some("secret".to_string()),
            page_size: 25,
            freshness_secs: 30,
            ..DeskConfig::default()
        };

        config.save_to(&path).unwrap();
        assert_eq!(DeskConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = 0\n").unwrap();

        let err = DeskConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = \"ten\"\n").unwrap();

        let err = DeskConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
