//! Local filesystem storage implementation.
//!
//! Keeps the record list in a single pretty-printed JSON file. Every
//! [`persist`](RecordStore::persist) writes the whole list to a temporary
//! sibling and renames it into place, so the file on disk is always either
//! the previous or the new complete list.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Record;
use crate::storage::{RecordStore, decode, encode};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage backed by the given JSON file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

#[async_trait]
impl RecordStore for LocalStorage {
    async fn ensure(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.path).await? {
            return Ok(());
        }
        log::info!("Creating empty store at {}", self.path.display());
        self.write_bytes(b"[]").await
    }

    async fn load(&self) -> Result<Vec<Record>> {
        match self.read_bytes().await? {
            Some(bytes) => decode(&self.location(), &bytes),
            None => {
                log::warn!("No store found at {}", self.path.display());
                Ok(Vec::new())
            }
        }
    }

    async fn persist(&self, records: &[Record]) -> Result<()> {
        let bytes = encode(records)?;
        self.write_bytes(&bytes).await
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
