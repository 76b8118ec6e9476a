//! Storage abstractions for record persistence.
//!
//! The store is a single ordered list of [`Record`]s holding at most one
//! record per date. It is rewritten in full after every append so that a
//! crash never loses a date that was already saved; the total write cost over
//! a long range is quadratic in the number of records.
//!
//! ## Directory Structure
//!
//! ```text
//! data/
//! ├── config.toml    # Optional configuration
//! ├── data.json      # Record list (pretty JSON array)
//! └── error.log      # Append-only diagnostics
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{DateKey, Record};

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// Trait for record storage backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the storage location holding an empty list if it is missing.
    async fn ensure(&self) -> Result<()>;

    /// Load every persisted record.
    ///
    /// An absent or zero-length store loads as empty. Content that is not a
    /// JSON array, whitespace included, is reported as
    /// [`AppError::CorruptStore`].
    async fn load(&self) -> Result<Vec<Record>>;

    /// Overwrite the persisted state with `records`.
    async fn persist(&self, records: &[Record]) -> Result<()>;

    /// Human-readable location, used in log messages.
    fn location(&self) -> String;
}

/// Whether `records` already hold a record for `date`.
pub fn contains(records: &[Record], date: &DateKey) -> bool {
    records.iter().any(|record| record.date == *date)
}

/// Add `record` at the end. Callers check [`contains`] first.
pub fn append(mut records: Vec<Record>, record: Record) -> Vec<Record> {
    records.push(record);
    records
}

/// Decode a persisted record list.
///
/// Only a zero-length store is empty. Entries that do not decode as a
/// [`Record`] are skipped with a warning; the rest of the list is kept.
pub(crate) fn decode(location: &str, bytes: &[u8]) -> Result<Vec<Record>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let entries: Vec<Value> =
        serde_json::from_slice(bytes).map_err(|e| AppError::corrupt_store(location, e))?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value(entry) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping entry {} of {}: {}", index, location, e),
        }
    }
    Ok(records)
}

/// Encode a record list the way it is persisted.
pub(crate) fn encode(records: &[Record]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str) -> Record {
        Record::empty(date.parse().unwrap())
    }

    #[test]
    fn test_contains() {
        let records = vec![record("2025-01-01"), record("2025-01-03")];
        assert!(contains(&records, &"2025-01-01".parse().unwrap()));
        assert!(!contains(&records, &"2025-01-02".parse().unwrap()));
        assert!(!contains(&[], &"2025-01-01".parse().unwrap()));
    }

    #[test]
    fn test_append_keeps_order_and_does_not_dedupe() {
        let records = append(vec![record("2025-01-02")], record("2025-01-01"));
        let records = append(records, record("2025-01-01"));
        let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, ["2025-01-02", "2025-01-01", "2025-01-01"]);
    }

    #[test]
    fn test_decode_empty() {
        assert!(decode("data.json", b"").unwrap().is_empty());
        assert!(decode("data.json", b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_decode_whitespace_is_corrupt() {
        let err = decode("data.json", b"  \n").unwrap_err();
        assert!(err.is_corrupt_store());
    }

    #[test]
    fn test_decode_skips_unreadable_entries() {
        let bytes = br#"[{"date":"2025-01-01","calendar":{"a":1},"extra":"keep me"},{"date":"n/a"},7]"#;
        let records = decode("data.json", bytes).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].calendar, Some(serde_json::json!({ "a": 1 })));
        assert_eq!(records[0].extra["extra"], "keep me");
    }

    #[test]
    fn test_decode_garbage_is_corrupt() {
        let err = decode("data.json", b"{ not json").unwrap_err();
        assert!(err.is_corrupt_store());
    }

    #[test]
    fn test_encode_is_pretty() {
        let bytes = encode(&[record("2025-01-01")]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("[\n  {\n    \"date\": \"2025-01-01\""));
    }
}
