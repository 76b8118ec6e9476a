//! Application configuration structures.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Date range and HTTP settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// File names inside the storage directory
    #[serde(default)]
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == Some(0) {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        if self.paths.data_file.trim().is_empty() {
            return Err(AppError::validation("paths.data_file is empty"));
        }
        if self.paths.error_log.trim().is_empty() {
            return Err(AppError::validation("paths.error_log is empty"));
        }
        if self.paths.data_file == self.paths.error_log {
            return Err(AppError::validation(
                "paths.data_file and paths.error_log must differ",
            ));
        }
        Ok(())
    }
}

/// Date range and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// First date of the planned range (inclusive)
    #[serde(default = "defaults::start_date")]
    pub start_date: NaiveDate,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds; unset leaves the transport default
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            start_date: defaults::start_date(),
            user_agent: defaults::user_agent(),
            timeout_secs: None,
        }
    }
}

/// Locations of the durable files, relative to the storage directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::data_file")]
    pub data_file: String,

    #[serde(default = "defaults::error_log")]
    pub error_log: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_file: defaults::data_file(),
            error_log: defaults::error_log(),
        }
    }
}

mod defaults {
    use chrono::NaiveDate;

    pub fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
    }
    pub fn user_agent() -> String {
        "almanac/0.1".into()
    }
    pub fn data_file() -> String {
        "data.json".into()
    }
    pub fn error_log() -> String {
        "error.log".into()
    }
}
