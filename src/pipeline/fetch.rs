// src/pipeline/fetch.rs

//! Incremental fetch-and-merge pipeline.
//!
//! Walks the planned dates in ascending order. Dates already in the store are
//! skipped; every other date gets its five facets fetched concurrently and is
//! appended and persisted before the next date starts. Dates are never
//! processed in parallel, so the store has a single writer at all times.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Config, DateKey, Record};
use crate::pipeline::plan::plan_dates;
use crate::services::FacetFetcher;
use crate::storage::{self, RecordStore};
use crate::utils::ErrorLog;

/// Summary of a fetch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Days between the start date and today
    pub planned: usize,
    /// Days already present in the store
    pub skipped: usize,
    /// Days fetched and saved during this run
    pub fetched: usize,
    /// Facet requests that failed during this run
    pub failed_facets: usize,
    /// Days saved during this run with every facet missing
    pub empty_dates: Vec<DateKey>,
    /// Whether the store was unreadable and replaced by an empty one
    pub recovered_corrupt_store: bool,
}

/// Run the fetch pipeline up to and including `today`.
///
/// Facet failures never end the run. Any other failure (typically the store
/// becoming unwritable) is written to the error log and returned; every date
/// persisted before it stays on disk for the next run.
pub async fn run_fetch(
    config: &Config,
    store: &dyn RecordStore,
    fetcher: &FacetFetcher,
    today: NaiveDate,
) -> Result<FetchReport> {
    match fetch_and_merge(config, store, fetcher, today).await {
        Ok(report) => Ok(report),
        Err(error) => {
            log::error!("Failed to fetch data: {}", error);
            let error_log = fetcher.error_log();
            if let Err(log_error) = error_log
                .record(&format!("Failed to fetch data: {error}"))
                .await
            {
                log::error!(
                    "Failed to write error log {}: {}",
                    error_log.path().display(),
                    log_error
                );
            }
            Err(error)
        }
    }
}

async fn fetch_and_merge(
    config: &Config,
    store: &dyn RecordStore,
    fetcher: &FacetFetcher,
    today: NaiveDate,
) -> Result<FetchReport> {
    log::info!("Fetching data...");
    store.ensure().await?;

    let mut report = FetchReport::default();
    let mut records = match load_existing(store, fetcher.error_log()).await? {
        Some(records) => records,
        None => {
            report.recovered_corrupt_store = true;
            Vec::new()
        }
    };

    let dates = plan_dates(config.fetcher.start_date, today);
    report.planned = dates.len();
    log::info!(
        "Planned {} date(s) from {} to {}, {} record(s) already stored",
        report.planned,
        config.fetcher.start_date,
        today,
        records.len()
    );

    for date in dates {
        if storage::contains(&records, &date) {
            log::info!("Skipping {}, already in {}.", date, store.location());
            report.skipped += 1;
            continue;
        }

        log::info!("Fetching data for {}...", date);
        let facets = fetcher.fetch_all(&date).await;
        report.failed_facets += facets.failure_count();

        let record = facets.into_record(date);
        if record.is_empty() {
            log::warn!("Every facet is missing for {}", date);
            report.empty_dates.push(date);
        }

        records = storage::append(records, record);
        store.persist(&records).await?;
        report.fetched += 1;
        log::info!("Saved {} to {}", date, store.location());
    }

    log::info!(
        "Fetch complete: {} fetched, {} skipped, {} facet failure(s)",
        report.fetched,
        report.skipped,
        report.failed_facets
    );
    Ok(report)
}

/// Load the stored records, or `None` when the content was unreadable.
///
/// Unreadable content is logged and treated as an empty store. Failures to
/// reach the storage at all are returned.
async fn load_existing(
    store: &dyn RecordStore,
    error_log: &ErrorLog,
) -> Result<Option<Vec<Record>>> {
    match store.load().await {
        Ok(records) => Ok(Some(records)),
        Err(error) if error.is_corrupt_store() => {
            log::warn!("{}. Starting from an empty store.", error);
            error_log
                .record(&format!("Error parsing {}: {}", store.location(), error))
                .await?;
            Ok(None)
        }
        Err(error) => Err(error),
    }
}
