// src/error.rs

use arrow::error::ArrowError;
use thiserror::Error;

/// Problems with the run configuration. Reported before any stage runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

/// Fatal: the run stops without touching the database or the catalog.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("object s3://{bucket}/{key} does not exist")]
    NotFound { bucket: String, key: String },

    #[error("reading s3://{bucket}/{key}: {cause:#}")]
    Storage {
        bucket: String,
        key: String,
        cause: anyhow::Error,
    },

    #[error("parsing {key} as CSV: {source}")]
    Parse {
        key: String,
        #[source]
        source: ArrowError,
    },

    #[error("{key} has no columns to parse")]
    Empty { key: String },
}

/// Why the relational load failed. Triggers the catalog fallback.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("connecting to {target}: {cause:#}")]
    Connect { target: String, cause: anyhow::Error },

    #[error("recreating table {table}: {cause:#}")]
    Schema { table: String, cause: anyhow::Error },

    #[error("writing rows into {table}: {cause:#}")]
    Write { table: String, cause: anyhow::Error },
}

/// Terminal: logged, never retried.
#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("catalog table {database}.{table} already exists")]
    AlreadyExists { database: String, table: String },

    #[error("creating catalog table {database}.{table}: {cause:#}")]
    Request {
        database: String,
        table: String,
        cause: anyhow::Error,
    },
}
