// src/testing.rs
//
// In-memory stand-ins for S3, MySQL and Glue used by the unit tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    catalog::{Catalog, ExternalTable},
    dataset::{Cell, Dataset},
    error::{FallbackError, LoadError},
    fetch::ObjectStore,
    load::{Database, Session},
};

pub fn init_logging() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
pub struct MemoryStore {
    objects: HashMap<(String, String), Bytes>,
    failure: Option<String>,
    gets: AtomicUsize,
}

impl MemoryStore {
    pub fn with_object(mut self, bucket: &str, key: &str, body: &str) -> Self {
        self.objects.insert(
            (bucket.to_string(), key.to_string()),
            Bytes::copy_from_slice(body.as_bytes()),
        );
        self
    }

    pub fn failing(mut self, cause: anyhow::Error) -> Self {
        self.failure = Some(format!("{:#}", cause));
        self
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Option<Bytes>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = &self.failure {
            return Err(anyhow!("{}", msg));
        }
        Ok(self
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

type Tables = Arc<Mutex<HashMap<String, StoredTable>>>;

#[derive(Default)]
pub struct MemoryDatabase {
    tables: Tables,
    refuse: Option<String>,
    write_failure: Option<String>,
    connects: AtomicUsize,
    closes: Arc<AtomicUsize>,
}

impl MemoryDatabase {
    pub fn refuse_connections(mut self, msg: &str) -> Self {
        self.refuse = Some(msg.to_string());
        self
    }

    pub fn fail_writes(mut self, msg: &str) -> Self {
        self.write_failure = Some(msg.to_string());
        self
    }

    pub fn seed(&self, table: &str, columns: &[&str], rows: Vec<Vec<Cell>>) {
        self.tables.lock().unwrap().insert(
            table.to_string(),
            StoredTable {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
        );
    }

    pub fn table(&self, name: &str) -> Option<StoredTable> {
        self.tables.lock().unwrap().get(name).cloned()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    type Session = MemorySession;

    fn target(&self) -> String {
        "memory://test".to_string()
    }

    async fn connect(&self) -> Result<MemorySession, LoadError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = &self.refuse {
            return Err(LoadError::Connect {
                target: self.target(),
                cause: anyhow!("{}", msg),
            });
        }
        Ok(MemorySession {
            tables: self.tables.clone(),
            write_failure: self.write_failure.clone(),
            closes: self.closes.clone(),
        })
    }
}

pub struct MemorySession {
    tables: Tables,
    write_failure: Option<String>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl Session for MemorySession {
    async fn replace_table(&mut self, table: &str, dataset: &Dataset) -> Result<(), LoadError> {
        if let Some(msg) = &self.write_failure {
            return Err(LoadError::Write {
                table: table.to_string(),
                cause: anyhow!("{}", msg),
            });
        }
        let rows = dataset.rows().map_err(|e| LoadError::Write {
            table: table.to_string(),
            cause: e.into(),
        })?;
        self.tables.lock().unwrap().insert(
            table.to_string(),
            StoredTable {
                columns: dataset.column_names(),
                rows,
            },
        );
        Ok(())
    }

    async fn close(self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingCatalog {
    existing: HashSet<(String, String)>,
    failure: Option<String>,
    calls: Mutex<Vec<(String, ExternalTable)>>,
}

impl RecordingCatalog {
    pub fn with_existing(mut self, database: &str, table: &str) -> Self {
        self.existing.insert((database.to_string(), table.to_string()));
        self
    }

    pub fn failing(mut self, msg: &str) -> Self {
        self.failure = Some(msg.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, ExternalTable)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Catalog for RecordingCatalog {
    async fn create_external_table(
        &self,
        database: &str,
        table: &ExternalTable,
    ) -> Result<(), FallbackError> {
        self.calls
            .lock()
            .unwrap()
            .push((database.to_string(), table.clone()));
        if let Some(msg) = &self.failure {
            return Err(FallbackError::Request {
                database: database.to_string(),
                table: table.name.clone(),
                cause: anyhow!("{}", msg),
            });
        }
        let key = (database.to_string(), table.name.clone());
        if self.existing.contains(&key) {
            return Err(FallbackError::AlreadyExists {
                database: key.0,
                table: key.1,
            });
        }
        Ok(())
    }
}
