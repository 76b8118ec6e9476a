// src/error.rs

//! Unified error handling for the almanac pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for almanac operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Persisted store could not be decoded
    #[error("Corrupt store {location}: {message}")]
    CorruptStore { location: String, message: String },

    /// A single facet request failed
    #[error("{facet} API error for {key}: {message}")]
    Facet {
        facet: String,
        key: String,
        message: String,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a corrupt store error.
    pub fn corrupt_store(location: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::CorruptStore {
            location: location.into(),
            message: message.to_string(),
        }
    }

    /// Create a facet error with context.
    pub fn facet(
        facet: impl Into<String>,
        key: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::Facet {
            facet: facet.into(),
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error means the store content was unreadable, as opposed
    /// to the storage itself being unavailable.
    pub fn is_corrupt_store(&self) -> bool {
        matches!(self, Self::CorruptStore { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_error_message() {
        let err = AppError::facet("Holidays", "2025", "status 503");
        assert_eq!(err.to_string(), "Holidays API error for 2025: status 503");
    }

    #[test]
    fn test_corrupt_store_detection() {
        assert!(AppError::corrupt_store("data.json", "expected value").is_corrupt_store());
        assert!(!AppError::config("missing").is_corrupt_store());
    }
}
