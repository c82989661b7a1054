// src/pipeline.rs

use tracing::{error, info, warn};

use crate::{
    catalog::{register_fallback, Catalog},
    config::Config,
    error::{FallbackError, FetchError, LoadError},
    fetch::{fetch_dataset, ObjectStore},
    load::{load_dataset, Database, LoadSummary},
};

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    /// The dataset replaced the database table.
    Loaded(LoadSummary),
    /// The load failed and the catalog table was registered instead.
    FellBack { load: LoadError },
    /// Nothing was loaded: the CSV could not be fetched.
    FetchFailed(FetchError),
    /// Both the load and the catalog registration failed.
    FallbackFailed {
        load: LoadError,
        fallback: FallbackError,
    },
}

impl Outcome {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Loaded(_) => 0,
            Outcome::FetchFailed(_) => 1,
            Outcome::FellBack { .. } => 2,
            Outcome::FallbackFailed { .. } => 3,
        }
    }
}

/// Fetch the CSV, load it into the database, and register the catalog
/// fallback if the load fails.
pub async fn run<S, D, C>(config: &Config, store: &S, database: &D, catalog: &C) -> Outcome
where
    S: ObjectStore + ?Sized,
    D: Database + ?Sized,
    C: Catalog + ?Sized,
{
    let dataset = match fetch_dataset(store, &config.source.bucket, &config.source.key).await {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("fatal error in pipeline: {}", e);
            return Outcome::FetchFailed(e);
        }
    };

    let load = match load_dataset(database, &config.database.table, &dataset).await {
        Ok(summary) => {
            info!(rows = summary.rows, columns = summary.columns, "run complete");
            return Outcome::Loaded(summary);
        }
        Err(e) => {
            error!("failed to upload data to database: {}", e);
            e
        }
    };
    // the catalog entry does not depend on the dataset
    drop(dataset);

    let cat = &config.catalog;
    match register_fallback(catalog, &cat.database, &cat.table, &cat.location).await {
        Ok(()) => {
            warn!("run complete via catalog fallback");
            Outcome::FellBack { load }
        }
        Err(fallback) => {
            error!("fallback to catalog failed: {}", fallback);
            Outcome::FallbackFailed { load, fallback }
        }
    }
}
