//! End-to-end run: generate, clean, back up, load, summarize.
//!
//! Generation failures end the run with an error. A failed connection ends it
//! early without any insert, but still counts as a completed run: the CSV
//! backups have already been written by then.

use crate::{
    config::{DatabaseConfig, GenerationConfig, database},
    core::{
        backup::{self, BackupOutcome},
        clean::CleaningReport,
        generate::{self, Dataset},
        load::{self, LoadReport},
        report::{self, Summary},
    },
    errors::Result,
};
use chrono::{NaiveDateTime, Timelike, Utc};
use sea_orm::DatabaseConnection;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// Everything a run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// Seed the dataset was generated from
    pub seed: u64,
    /// The cleaned dataset
    pub dataset: Dataset,
    /// Records dropped by cleaning
    pub cleaning: CleaningReport,
    /// One entry per backup file
    pub backups: Vec<BackupOutcome>,
    /// Per-table load results; `None` when no connection could be made
    pub load: Option<LoadReport>,
    /// Post-load summary; `None` when there was no connection or the queries failed
    pub summary: Option<Summary>,
    /// Wall-clock time of the whole run
    pub elapsed: Duration,
}

impl RunOutcome {
    /// Whether backups, every table and the summary all succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.backups.iter().all(BackupOutcome::is_ok)
            && self.load.as_ref().is_some_and(LoadReport::is_complete)
            && self.summary.is_some()
    }
}

/// Generates, cleans and backs up a dataset without touching the database.
#[instrument(skip(config))]
pub fn prepare(
    config: &GenerationConfig,
    seed: u64,
    reference: NaiveDateTime,
) -> Result<(Dataset, CleaningReport, Vec<BackupOutcome>)> {
    config.validate()?;
    let (dataset, cleaning) = generate::generate_dataset(config, seed, reference)?;
    info!(
        "Data cleaned - {} records removed ({} customers, {} products, {} order items)",
        cleaning.total_removed(),
        cleaning.customers_removed,
        cleaning.products_removed,
        cleaning.order_items_removed
    );
    let backups = backup::write_backups(&config.output_dir, &dataset);
    Ok((dataset, cleaning, backups))
}

/// Loads `dataset` through `db`, then summarizes. The connection is closed
/// before returning, whatever happened.
pub async fn load_and_summarize(
    db: DatabaseConnection,
    dataset: &Dataset,
    batch_size: usize,
) -> (LoadReport, Option<Summary>) {
    if let Err(e) = database::create_tables(&db).await {
        warn!("Could not ensure tables exist, loading into existing schema: {e}");
    }

    let load = load::load_dataset(&db, dataset, batch_size).await;
    let summary = match report::summarize(&db).await {
        Ok(summary) => Some(summary),
        Err(e) => {
            error!("Failed to compute summary: {e}");
            None
        }
    };

    match db.close().await {
        Ok(()) => info!("Database connection closed"),
        Err(e) => warn!("Error closing database connection: {e}"),
    }
    (load, summary)
}

/// Runs the whole pipeline.
///
/// # Errors
/// Returns an error only for invalid settings or a generation failure.
/// Connection, insert and backup failures are reported in the outcome.
pub async fn run(config: &GenerationConfig, db_config: &DatabaseConfig) -> Result<RunOutcome> {
    let start = Instant::now();
    let seed = config.seed.unwrap_or_else(rand::random);
    info!("Generating dataset with seed {seed}");

    let (dataset, cleaning, backups) = prepare(config, seed, reference_now())?;

    let (load, summary) = match database::connect(db_config).await {
        Ok(db) => {
            info!("Connected to database: {}", db_config.describe());
            let (load, summary) = load_and_summarize(db, &dataset, config.batch_size).await;
            (Some(load), summary)
        }
        Err(e) => {
            error!("Error connecting to database, nothing was inserted: {e}");
            (None, None)
        }
    };

    Ok(RunOutcome {
        seed,
        dataset,
        cleaning,
        backups,
        load,
        summary,
        elapsed: start.elapsed(),
    })
}

/// Current UTC time truncated to whole seconds.
#[must_use]
pub fn reference_now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}
