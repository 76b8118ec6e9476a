//! In-memory storage backend.
//!
//! Holds the persisted list in a mutex instead of a file. Useful for driving
//! the pipeline without touching disk.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::Record;
use crate::storage::{RecordStore, decode, encode};

#[derive(Debug, Default)]
struct State {
    /// Persisted bytes; `None` until the store is created.
    bytes: Option<Vec<u8>>,
    persist_count: usize,
    /// Fail every persist after this many successful ones.
    fail_after: Option<usize>,
}

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously persisted records.
    pub fn with_records(records: &[Record]) -> Result<Self> {
        let storage = Self::new();
        storage.state().bytes = Some(encode(records)?);
        Ok(storage)
    }

    /// Start from raw persisted content, which need not be valid.
    pub fn with_raw(content: impl Into<Vec<u8>>) -> Self {
        let storage = Self::new();
        storage.state().bytes = Some(content.into());
        storage
    }

    /// Make every persist after the first `successes` fail.
    pub fn fail_after(self, successes: usize) -> Self {
        self.state().fail_after = Some(successes);
        self
    }

    /// Number of successful persists so far.
    pub fn persist_count(&self) -> usize {
        self.state().persist_count
    }

    /// Decode the currently persisted records.
    pub fn snapshot(&self) -> Result<Vec<Record>> {
        let bytes = self.state().bytes.clone().unwrap_or_default();
        decode(&self.location(), &bytes)
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A poisoned lock still holds consistent data: writes replace the
        // byte buffer in one assignment.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryStorage {
    async fn ensure(&self) -> Result<()> {
        let mut state = self.state();
        if state.bytes.is_none() {
            state.bytes = Some(b"[]".to_vec());
        }
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Record>> {
        self.snapshot()
    }

    async fn persist(&self, records: &[Record]) -> Result<()> {
        let bytes = encode(records)?;
        let mut state = self.state();
        if state.fail_after.is_some_and(|limit| state.persist_count >= limit) {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "memory store is read-only",
            )));
        }
        state.bytes = Some(bytes);
        state.persist_count += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let storage = MemoryStorage::new();
        storage.ensure().await.unwrap();
        assert!(storage.load().await.unwrap().is_empty());

        let records = vec![Record::empty("2025-01-01".parse().unwrap())];
        storage.persist(&records).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), records);
        assert_eq!(storage.persist_count(), 1);
    }

    #[tokio::test]
    async fn test_fail_after() {
        let storage = MemoryStorage::new().fail_after(1);
        let records = vec![Record::empty("2025-01-01".parse().unwrap())];

        assert!(storage.persist(&records).await.is_ok());
        assert!(storage.persist(&records).await.is_err());
        assert_eq!(storage.persist_count(), 1);
    }

    #[tokio::test]
    async fn test_raw_garbage_is_corrupt() {
        let storage = MemoryStorage::with_raw("oops");
        assert!(storage.load().await.unwrap_err().is_corrupt_store());
    }
}
