//! almanac CLI
//!
//! Running without a subcommand fetches every missing date up to today.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};

use almanac::{
    error::Result,
    models::Config,
    pipeline,
    services::{FacetFetcher, HttpFacetSource},
    storage::{LocalStorage, RecordStore},
    utils::ErrorLog,
};

/// almanac - calendar, astronomy and holiday data collector
#[derive(Parser, Debug)]
#[command(name = "almanac", version, about = "Incremental calendar data fetcher")]
struct Cli {
    /// Directory holding config.toml, the data file and the error log
    #[arg(short, long, default_value = "data")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch every date from the start date through today that is not stored yet
    Fetch,

    /// Render the stored records into an iCalendar file
    Render {
        /// Output path of the .ics file
        #[arg(short, long, default_value = "calendar.ics")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,

    /// Show store and error log info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    log::debug!("Loaded configuration from {}", cli.storage_dir.display());

    let storage = LocalStorage::new(cli.storage_dir.join(&config.paths.data_file));
    let error_log_path = cli.storage_dir.join(&config.paths.error_log);

    match cli.command.unwrap_or(Command::Fetch) {
        Command::Fetch => {
            config.validate()?;
            let error_log = ErrorLog::open(&error_log_path).await?;
            let source = HttpFacetSource::from_config(&config)?;
            let fetcher = FacetFetcher::new(Arc::new(source), error_log);

            let today = Utc::now().date_naive();
            let report = pipeline::run_fetch(&config, &storage, &fetcher, today).await?;

            if !report.empty_dates.is_empty() {
                log::warn!(
                    "{} date(s) were saved without any facet and will not be fetched again",
                    report.empty_dates.len()
                );
            }
        }

        Command::Render { output } => {
            pipeline::run_render(&storage, &output).await?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (start date {})", config.fetcher.start_date);
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            let records = storage.load().await?;
            log::info!("Records: {}", records.len());
            if let (Some(first), Some(last)) = (records.first(), records.last()) {
                log::info!("Range: {} .. {}", first.date, last.date);
            }
            let empty = records.iter().filter(|r| r.is_empty()).count();
            if empty > 0 {
                log::info!("Records without any facet: {}", empty);
            }

            if error_log_path.exists() {
                let entries = ErrorLog::open(&error_log_path).await?.entries().await?;
                log::info!("Error log entries: {}", entries.len());
                if let Some(last) = entries.last() {
                    log::info!("Last error: {}", last);
                }
            } else {
                log::info!("No error log found yet.");
            }
        }
    }

    Ok(())
}
