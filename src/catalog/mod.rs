// src/catalog/mod.rs

use async_trait::async_trait;
use tracing::info;

use crate::error::FallbackError;

pub mod glue;

pub use glue::GlueCatalog;

pub const TEXT_INPUT_FORMAT: &str = "org.apache.hadoop.mapred.TextInputFormat";
pub const TEXT_OUTPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.HiveIgnoreKeyTextOutputFormat";
pub const LAZY_SIMPLE_SERDE: &str = "org.apache.hadoop.hive.serde2.lazy.LazySimpleSerDe";
pub const EXTERNAL_TABLE: &str = "EXTERNAL_TABLE";

/// Columns registered for the fallback table. Fixed, not taken from the
/// fetched dataset.
pub const FALLBACK_COLUMNS: &[(&str, &str)] = &[("name", "string"), ("age", "int")];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumn {
    pub name: String,
    pub ty: String,
}

/// Definition of a catalog table whose data lives in object storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTable {
    pub name: String,
    pub columns: Vec<CatalogColumn>,
    pub location: String,
    pub input_format: String,
    pub output_format: String,
    pub serialization_library: String,
    pub field_delimiter: String,
    pub table_type: String,
}

impl ExternalTable {
    /// Comma-delimited text table over `location` with [`FALLBACK_COLUMNS`].
    pub fn fallback(name: &str, location: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: FALLBACK_COLUMNS
                .iter()
                .map(|(name, ty)| CatalogColumn {
                    name: name.to_string(),
                    ty: ty.to_string(),
                })
                .collect(),
            location: location.to_string(),
            input_format: TEXT_INPUT_FORMAT.to_string(),
            output_format: TEXT_OUTPUT_FORMAT.to_string(),
            serialization_library: LAZY_SIMPLE_SERDE.to_string(),
            field_delimiter: ",".to_string(),
            table_type: EXTERNAL_TABLE.to_string(),
        }
    }
}

/// A metadata catalog that can register external tables.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn create_external_table(
        &self,
        database: &str,
        table: &ExternalTable,
    ) -> Result<(), FallbackError>;
}

/// Register the fallback table `database.table` over `location`.
pub async fn register_fallback<C>(
    catalog: &C,
    database: &str,
    table: &str,
    location: &str,
) -> Result<(), FallbackError>
where
    C: Catalog + ?Sized,
{
    info!("falling back to catalog table {}.{} at {}", database, table, location);
    let definition = ExternalTable::fallback(table, location);
    catalog.create_external_table(database, &definition).await?;
    info!("catalog fallback succeeded, table {}.{} created", database, table);
    Ok(())
}
