// src/utils/error_log.rs

//! Append-only diagnostic log file.
//!
//! Each line has the form `[<ISO 8601 timestamp>] <message>`. The file is
//! only ever appended to; it is not the source of truth for any data.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// A single line of the error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorLogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl ErrorLogEntry {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.message
        )
    }
}

impl FromStr for ErrorLogEntry {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self> {
        let invalid = || AppError::validation(format!("Malformed error log line: {line}"));

        let rest = line.strip_prefix('[').ok_or_else(invalid)?;
        let (timestamp, message) = rest.split_once("] ").ok_or_else(invalid)?;
        let timestamp = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|_| invalid())?
            .with_timezone(&Utc);

        Ok(Self {
            timestamp,
            message: message.to_string(),
        })
    }
}

/// Handle to the error log file.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    /// Open the log at `path`, creating it (and its directory) empty if absent.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line.
    pub async fn record(&self, message: &str) -> Result<()> {
        let entry = ErrorLogEntry::now(message);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{entry}\n").as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Read every well-formed entry back. Diagnostics only.
    pub async fn entries(&self) -> Result<Vec<ErrorLogEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(e)),
        };
        Ok(content
            .lines()
            .filter_map(|line| line.parse().ok())
            .collect())
    }
}
