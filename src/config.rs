//! Application configuration
//!
//! A small JSON file next to the binary plus an environment override for the
//! endpoint base URL. Missing or malformed files fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::config::{BASE_URL_ENV, CONFIG_FILE, DEFAULT_BASE_URL};
use crate::constants::net::INSIGHT_PATH;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Base URL of the admin backend serving the insight endpoint
    pub base_url: String,

    /// Optional local payload file rendered instead of an initial fetch
    pub payload_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), payload_path: None }
    }
}

impl AppConfig {
    /// Load the configuration from the working directory, falling back to
    /// defaults, then apply environment overrides
    pub fn load() -> Self {
        let config = match Self::load_from(Path::new(CONFIG_FILE)) {
            Ok(config) => config,
            Err(e) => {
                if Path::new(CONFIG_FILE).exists() {
                    warn!(error = %e, "failed to read config; using defaults");
                }
                Self::default()
            }
        };
        config.apply_env()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn apply_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            if !base_url.trim().is_empty() {
                self.base_url = base_url;
            }
        }
        self
    }

    /// Full URL of the insight endpoint for a given query string
    pub fn insight_url(&self, query: &str) -> String {
        format!("{}{}?{}", self.base_url.trim_end_matches('/'), INSIGHT_PATH, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.payload_path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "baseUrl": "https://admin.example.com/", "payloadPath": "insight.json" }}"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.base_url, "https://admin.example.com/");
        assert_eq!(config.payload_path, Some(PathBuf::from("insight.json")));
    }

    #[test]
    fn test_insight_url_joins_cleanly() {
        let config = AppConfig {
            base_url: "https://admin.example.com/".to_string(),
            payload_path: None,
        };
        assert_eq!(
            config.insight_url("range=recent-14"),
            "https://admin.example.com/service-insight?range=recent-14"
        );
    }

    #[test]
    fn test_missing_file_is_an_error_for_load_from() {
        assert!(AppConfig::load_from(Path::new("/definitely/not/here.json")).is_err());
    }
}
