// src/services/facets.rs

//! Facet fetcher service.
//!
//! Issues one request per facet and downgrades every failure to a
//! [`FacetOutcome::Failed`] plus an error log line, so one unavailable
//! source never aborts its siblings or the date being fetched.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Config, DateKey, FacetKind, FacetOutcome, Record};
use crate::utils::{ErrorLog, http};

/// Network boundary for a single facet request.
#[async_trait]
pub trait FacetSource: Send + Sync {
    /// Fetch the payload of `kind` for `key` (a date or a four-digit year).
    async fn request(&self, kind: FacetKind, key: &str) -> Result<Value>;
}

/// [`FacetSource`] backed by the public HTTP APIs.
pub struct HttpFacetSource {
    client: reqwest::Client,
}

impl HttpFacetSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(http::create_client(&config.fetcher)?))
    }
}

#[async_trait]
impl FacetSource for HttpFacetSource {
    async fn request(&self, kind: FacetKind, key: &str) -> Result<Value> {
        let url = kind.endpoint(key)?;
        log::debug!("GET {}", url);
        http::fetch_json(&self.client, url)
            .await
            .map_err(|e| AppError::facet(kind.name(), key, e))
    }
}

/// Outcomes of all five facets for one date.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetSet {
    pub calendar: FacetOutcome,
    pub astro: FacetOutcome,
    pub shichen: FacetOutcome,
    pub jieqi: FacetOutcome,
    pub holidays: FacetOutcome,
}

impl FacetSet {
    pub fn failure_count(&self) -> usize {
        [
            &self.calendar,
            &self.astro,
            &self.shichen,
            &self.jieqi,
            &self.holidays,
        ]
        .iter()
        .filter(|outcome| outcome.is_failed())
        .count()
    }

    /// Assemble the stored record for `date`.
    pub fn into_record(self, date: DateKey) -> Record {
        Record {
            date,
            calendar: self.calendar.into_payload(),
            astro: self.astro.into_payload(),
            shichen: self.shichen.into_payload(),
            jieqi: self.jieqi.into_payload(),
            holidays: self.holidays.into_payload(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Service fetching facets with the never-fail-upward policy.
#[derive(Clone)]
pub struct FacetFetcher {
    source: Arc<dyn FacetSource>,
    error_log: ErrorLog,
}

impl FacetFetcher {
    pub fn new(source: Arc<dyn FacetSource>, error_log: ErrorLog) -> Self {
        Self { source, error_log }
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    /// Fetch one facet of `date`. Never returns an error.
    pub async fn fetch(&self, kind: FacetKind, date: &DateKey) -> FacetOutcome {
        let key = kind.key_for(date);
        match self.source.request(kind, &key).await {
            Ok(value) => FacetOutcome::Fetched(value),
            Err(error) => {
                let message = match error {
                    AppError::Facet { message, .. } => message,
                    other => other.to_string(),
                };
                log::warn!("{} API error for {} ({}): {}", kind, key, date, message);

                let line = format!("{kind} API error for {key} (date {date}): {message}");
                if let Err(log_error) = self.error_log.record(&line).await {
                    log::error!(
                        "Failed to write error log {}: {}",
                        self.error_log.path().display(),
                        log_error
                    );
                }
                FacetOutcome::Failed(message)
            }
        }
    }

    pub async fn calendar(&self, date: &DateKey) -> FacetOutcome {
        self.fetch(FacetKind::Calendar, date).await
    }

    pub async fn astro(&self, date: &DateKey) -> FacetOutcome {
        self.fetch(FacetKind::Astro, date).await
    }

    pub async fn shichen(&self, date: &DateKey) -> FacetOutcome {
        self.fetch(FacetKind::Shichen, date).await
    }

    pub async fn jieqi(&self, date: &DateKey) -> FacetOutcome {
        self.fetch(FacetKind::Jieqi, date).await
    }

    pub async fn holidays(&self, date: &DateKey) -> FacetOutcome {
        self.fetch(FacetKind::Holidays, date).await
    }

    /// Fetch all five facets of `date` concurrently and wait for every one.
    pub async fn fetch_all(&self, date: &DateKey) -> FacetSet {
        let (calendar, astro, shichen, jieqi, holidays) = futures::join!(
            self.calendar(date),
            self.astro(date),
            self.shichen(date),
            self.jieqi(date),
            self.holidays(date)
        );

        FacetSet {
            calendar,
            astro,
            shichen,
            jieqi,
            holidays,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use serde_json::json;
    use tempfile::TempDir;

    /// Answers every request except the listed facets.
    struct PartialSource {
        failing: Vec<FacetKind>,
        calls: Mutex<Vec<(FacetKind, String)>>,
    }

    #[async_trait]
    impl FacetSource for PartialSource {
        async fn request(&self, kind: FacetKind, key: &str) -> Result<Value> {
            self.calls.lock().unwrap().push((kind, key.to_string()));
            if self.failing.contains(&kind) {
                return Err(AppError::facet(kind.name(), key, "status 503"));
            }
            Ok(json!({ "facet": kind.name(), "key": key }))
        }
    }

    async fn fetcher(tmp: &TempDir, failing: Vec<FacetKind>) -> (FacetFetcher, Arc<PartialSource>) {
        let source = Arc::new(PartialSource {
            failing,
            calls: Mutex::new(Vec::new()),
        });
        let log = ErrorLog::open(tmp.path().join("error.log")).await.unwrap();
        (FacetFetcher::new(source.clone(), log), source)
    }

    #[tokio::test]
    async fn test_fetch_all_uses_date_and_year_keys() {
        let tmp = TempDir::new().unwrap();
        let (fetcher, source) = fetcher(&tmp, vec![]).await;
        let date: DateKey = "2025-01-02".parse().unwrap();

        let set = fetcher.fetch_all(&date).await;
        assert_eq!(set.failure_count(), 0);
        assert_eq!(
            set.jieqi,
            FacetOutcome::Fetched(json!({ "facet": "Jieqi", "key": "2025" }))
        );

        let mut calls = source.calls.lock().unwrap().clone();
        calls.sort_by_key(|(kind, _)| kind.name());
        assert_eq!(calls.len(), 5);
        for (kind, key) in calls {
            assert_eq!(key, kind.key_for(&date));
        }
    }

    /// Holds every request open briefly and tracks how many overlap.
    #[derive(Default)]
    struct GaugeSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl FacetSource for GaugeSource {
        async fn request(&self, kind: FacetKind, key: &str) -> Result<Value> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(json!({ "facet": kind.name(), "key": key }))
        }
    }

    #[tokio::test]
    async fn test_fetch_all_overlaps_all_five_requests() {
        let tmp = TempDir::new().unwrap();
        let log = ErrorLog::open(tmp.path().join("error.log")).await.unwrap();
        let source = Arc::new(GaugeSource::default());
        let fetcher = FacetFetcher::new(source.clone(), log);
        let date: DateKey = "2025-01-01".parse().unwrap();

        let set = fetcher.fetch_all(&date).await;

        assert_eq!(set.failure_count(), 0);
        assert_eq!(source.peak.load(Ordering::SeqCst), 5);
        assert_eq!(source.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_is_logged_not_propagated() {
        let tmp = TempDir::new().unwrap();
        let (fetcher, _) = fetcher(&tmp, vec![FacetKind::Holidays]).await;
        let date: DateKey = "2025-01-02".parse().unwrap();

        let set = fetcher.fetch_all(&date).await;
        assert_eq!(set.failure_count(), 1);
        assert_eq!(set.holidays, FacetOutcome::Failed("status 503".into()));

        let record = set.into_record(date);
        assert!(record.holidays.is_none());
        assert_eq!(record.facet_count(), 4);

        let entries = fetcher.error_log().entries().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].message.starts_with("Holidays API error for 2025"));
        assert!(entries[0].message.contains("2025-01-02"));
    }

    #[tokio::test]
    async fn test_fetched_null_is_not_a_failure() {
        struct NullSource;

        #[async_trait]
        impl FacetSource for NullSource {
            async fn request(&self, _kind: FacetKind, _key: &str) -> Result<Value> {
                Ok(Value::Null)
            }
        }

        let tmp = TempDir::new().unwrap();
        let log = ErrorLog::open(tmp.path().join("error.log")).await.unwrap();
        let fetcher = FacetFetcher::new(Arc::new(NullSource), log);
        let date: DateKey = "2025-01-01".parse().unwrap();

        let outcome = fetcher.astro(&date).await;
        assert_eq!(outcome, FacetOutcome::Fetched(Value::Null));
        assert!(fetcher.error_log().entries().await.unwrap().is_empty());
    }
}
