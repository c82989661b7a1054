// src/catalog/glue.rs

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_glue::{
    error::DisplayErrorContext,
    types::{Column, SerDeInfo, StorageDescriptor, TableInput},
    Client,
};

use super::{Catalog, ExternalTable};
use crate::error::FallbackError;

/// [`Catalog`] over the AWS Glue Data Catalog.
#[derive(Clone)]
pub struct GlueCatalog {
    client: Client,
}

impl GlueCatalog {
    pub fn new(sdk: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk),
        }
    }
}

/// Translate an [`ExternalTable`] into Glue's `TableInput`.
pub fn table_input(table: &ExternalTable) -> Result<TableInput> {
    let columns = table
        .columns
        .iter()
        .map(|c| {
            Column::builder()
                .name(&c.name)
                .r#type(&c.ty)
                .build()
                .with_context(|| format!("building column {}", c.name))
        })
        .collect::<Result<Vec<_>>>()?;

    let serde = SerDeInfo::builder()
        .serialization_library(&table.serialization_library)
        .parameters("field.delim", &table.field_delimiter)
        .build();

    let storage = StorageDescriptor::builder()
        .set_columns(Some(columns))
        .location(&table.location)
        .input_format(&table.input_format)
        .output_format(&table.output_format)
        .serde_info(serde)
        .build();

    TableInput::builder()
        .name(&table.name)
        .storage_descriptor(storage)
        .table_type(&table.table_type)
        .build()
        .context("building table input")
}

#[async_trait]
impl Catalog for GlueCatalog {
    async fn create_external_table(
        &self,
        database: &str,
        table: &ExternalTable,
    ) -> Result<(), FallbackError> {
        let request_err = |cause: anyhow::Error| FallbackError::Request {
            database: database.to_string(),
            table: table.name.clone(),
            cause,
        };

        let input = table_input(table).map_err(request_err)?;

        match self
            .client
            .create_table()
            .database_name(database)
            .table_input(input)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_already_exists_exception()) =>
            {
                Err(FallbackError::AlreadyExists {
                    database: database.to_string(),
                    table: table.name.clone(),
                })
            }
            Err(err) => Err(request_err(anyhow!("{}", DisplayErrorContext(&err)))),
        }
    }
}
