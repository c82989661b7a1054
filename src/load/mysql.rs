// src/load/mysql.rs

use anyhow::Context;
use arrow::datatypes::{DataType, Schema};
use async_trait::async_trait;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlConnection},
    ConnectOptions, Connection, MySql, QueryBuilder,
};
use tracing::debug;

use super::{Database, Session};
use crate::{
    config::DatabaseConfig,
    dataset::{Cell, Dataset},
    error::LoadError,
};

/// MySQL caps a prepared statement at 65,535 placeholders.
const MAX_PLACEHOLDERS: usize = 65_535;
const MAX_ROWS_PER_INSERT: usize = 1_000;

/// A MySQL server, e.g. an RDS instance.
pub struct MySqlDatabase {
    options: MySqlConnectOptions,
    target: String,
}

impl MySqlDatabase {
    pub fn new(cfg: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&cfg.host)
            .port(cfg.port)
            .username(&cfg.user)
            .password(&cfg.password)
            .database(&cfg.name);
        let target = format!("mysql://{}@{}:{}/{}", cfg.user, cfg.host, cfg.port, cfg.name);
        Self { options, target }
    }
}

#[async_trait]
impl Database for MySqlDatabase {
    type Session = MySqlSession;

    fn target(&self) -> String {
        self.target.clone()
    }

    async fn connect(&self) -> Result<MySqlSession, LoadError> {
        let conn = self
            .options
            .connect()
            .await
            .map_err(|e| LoadError::Connect {
                target: self.target.clone(),
                cause: e.into(),
            })?;
        Ok(MySqlSession { conn })
    }
}

pub struct MySqlSession {
    conn: MySqlConnection,
}

#[async_trait]
impl Session for MySqlSession {
    async fn replace_table(&mut self, table: &str, dataset: &Dataset) -> Result<(), LoadError> {
        let schema_err = |cause: anyhow::Error| LoadError::Schema {
            table: table.to_string(),
            cause,
        };
        let write_err = |cause: anyhow::Error| LoadError::Write {
            table: table.to_string(),
            cause,
        };

        // DDL commits implicitly in MySQL, so it stays outside the transaction.
        sqlx::query(&drop_table_sql(table))
            .execute(&mut self.conn)
            .await
            .context("dropping previous table")
            .map_err(schema_err)?;
        sqlx::query(&create_table_sql(table, &dataset.schema()))
            .execute(&mut self.conn)
            .await
            .context("creating table")
            .map_err(schema_err)?;

        let columns = dataset.column_names();
        let rows = dataset
            .rows()
            .context("reading dataset rows")
            .map_err(write_err)?;
        let chunk_size = rows_per_insert(columns.len());

        let mut tx = self
            .conn
            .begin()
            .await
            .context("starting transaction")
            .map_err(write_err)?;
        for (i, chunk) in rows.chunks(chunk_size).enumerate() {
            insert_statement(table, &columns, chunk)
                .build()
                .execute(&mut *tx)
                .await
                .with_context(|| format!("inserting chunk {} ({} rows)", i, chunk.len()))
                .map_err(write_err)?;
            debug!(chunk = i, rows = chunk.len(), "inserted rows");
        }
        tx.commit()
            .await
            .context("committing inserts")
            .map_err(write_err)?;

        Ok(())
    }

    async fn close(self) -> anyhow::Result<()> {
        self.conn
            .close()
            .await
            .context("closing MySQL connection")
    }
}

/// Map an inferred Arrow type onto the MySQL column type used to store it.
pub fn map_to_mysql_type(ty: &DataType) -> &'static str {
    match ty {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32 => "BIGINT",
        DataType::UInt64 => "BIGINT UNSIGNED",
        DataType::Float16 | DataType::Float32 | DataType::Float64 => "DOUBLE",
        DataType::Boolean => "BOOLEAN",
        DataType::Date32 | DataType::Date64 => "DATE",
        DataType::Timestamp(_, _) => "DATETIME(6)",
        _ => "TEXT",
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table))
}

pub fn create_table_sql(table: &str, schema: &Schema) -> String {
    let columns = schema
        .fields()
        .iter()
        .map(|f| format!("{} {}", quote_ident(f.name()), map_to_mysql_type(f.data_type())))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({})", quote_ident(table), columns)
}

/// Rows per multi-row INSERT so one statement stays under the placeholder cap.
pub fn rows_per_insert(columns: usize) -> usize {
    (MAX_PLACEHOLDERS / columns.max(1)).clamp(1, MAX_ROWS_PER_INSERT)
}

fn insert_statement<'a>(
    table: &str,
    columns: &[String],
    rows: &'a [Vec<Cell>],
) -> QueryBuilder<'a, MySql> {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let mut qb = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        quote_ident(table),
        column_list
    ));
    qb.push_values(rows, |mut b, row| {
        for cell in row {
            match cell {
                Cell::Null => b.push_bind(None::<String>),
                Cell::Int(v) => b.push_bind(*v),
                Cell::Float(v) => b.push_bind(*v),
                Cell::Bool(v) => b.push_bind(*v),
                Cell::Text(v) => b.push_bind(v.as_str()),
            };
        }
    });
    qb
}
