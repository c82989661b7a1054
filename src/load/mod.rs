// src/load/mod.rs

use async_trait::async_trait;
use tracing::{info, warn};

use crate::{dataset::Dataset, error::LoadError};

pub mod mysql;

pub use mysql::MySqlDatabase;

/// A relational target that hands out one session per load.
#[async_trait]
pub trait Database: Send + Sync {
    type Session: Session;

    /// Human-readable target for logs. Must not contain credentials.
    fn target(&self) -> String;

    async fn connect(&self) -> Result<Self::Session, LoadError>;
}

/// An open connection to a [`Database`].
#[async_trait]
pub trait Session: Send + Sized {
    /// Drop `table` if present, recreate it from the dataset's schema and
    /// insert every row.
    async fn replace_table(&mut self, table: &str, dataset: &Dataset) -> Result<(), LoadError>;

    /// Release the connection.
    async fn close(self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub columns: usize,
}

/// Replace `table` in `database` with the contents of `dataset`.
///
/// The session is closed before returning whether or not the write succeeded.
/// A failure to close after a successful write is logged and otherwise ignored.
pub async fn load_dataset<D>(
    database: &D,
    table: &str,
    dataset: &Dataset,
) -> Result<LoadSummary, LoadError>
where
    D: Database + ?Sized,
{
    info!("connecting to {}", database.target());
    let mut session = database.connect().await?;

    info!(rows = dataset.num_rows(), "pushing data to table '{}'", table);
    let written = session.replace_table(table, dataset).await;

    if let Err(e) = session.close().await {
        warn!("closing connection to {}: {:#}", database.target(), e);
    }

    written?;
    info!("data successfully pushed to table '{}'", table);
    Ok(LoadSummary {
        rows: dataset.num_rows(),
        columns: dataset.num_columns(),
    })
}
