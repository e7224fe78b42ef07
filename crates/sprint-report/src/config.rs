//! Report configuration
//!
//! Read from a TOML file; command line flags override file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sprint_data::{FileFetcher, HttpFetcher, ResourceFetcher};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Configuration file used when `--config` is not given, if present
pub(crate) const DEFAULT_CONFIG_FILE: &str = "sprint-report.toml";

/// Report configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ReportConfig {
    /// Directory or `http(s)://` base URL holding `data/`
    pub(crate) data_root: String,
    /// Label language
    pub(crate) language: String,
    /// Language tried when a label is missing
    pub(crate) fallback_language: String,
    /// Label for formula attributes without one
    pub(crate) placeholder: String,
    /// Log filter when `RUST_LOG` is not set
    pub(crate) log_level: String,
    /// Log as JSON lines
    pub(crate) log_json: bool,
    /// Per-request timeout for HTTP data roots
    pub(crate) request_timeout_secs: u64,
}

impl ReportConfig {
    /// Load configuration from a TOML file
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config '{}'", path.display()))
    }

    /// Load an explicit file, else the default file if present, else defaults
    pub(crate) fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    /// With data root
    #[must_use]
    pub(crate) fn with_data_root(mut self, data_root: impl Into<String>) -> Self {
        self.data_root = data_root.into();
        self
    }

    /// With label language
    #[must_use]
    pub(crate) fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// With log filter
    #[must_use]
    pub(crate) fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// With JSON logging
    #[inline]
    #[must_use]
    pub(crate) fn with_log_json(mut self, json: bool) -> Self {
        self.log_json = json;
        self
    }

    /// Whether the data root is a URL
    #[must_use]
    pub(crate) fn is_remote(&self) -> bool {
        self.data_root.starts_with("http://") || self.data_root.starts_with("https://")
    }

    /// Fetcher for the data root
    pub(crate) fn fetcher(&self) -> Result<Arc<dyn ResourceFetcher>> {
        if self.is_remote() {
            let timeout = Duration::from_secs(self.request_timeout_secs);
            let fetcher = HttpFetcher::new(self.data_root.clone(), timeout)
                .context("failed to create HTTP client")?;
            Ok(Arc::new(fetcher))
        } else {
            Ok(Arc::new(FileFetcher::new(&self.data_root)))
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_root: ".".to_string(),
            language: "en".to_string(),
            fallback_language: "en".to_string(),
            placeholder: "?".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            request_timeout_secs: 30,
        }
    }
}
