// src/dataset.rs

use arrow::{
    array::{Array, AsArray},
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder},
    datatypes::{
        DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, Schema,
        SchemaRef,
    },
    error::ArrowError,
    record_batch::RecordBatch,
    util::display::{ArrayFormatter, FormatOptions},
};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

const CSV_BATCH_SIZE: usize = 8192;

/// A single value pulled out of a [`Dataset`] for writing to a database.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// The whole CSV object, held in memory as one Arrow batch.
///
/// Column names come from the CSV header and column types are whatever the
/// Arrow CSV reader infers from the values.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    /// Parse CSV bytes (with a header row) into a dataset.
    ///
    /// Returns `Ok(None)` when there is no header to take column names from.
    pub fn from_csv(data: &[u8]) -> Result<Option<Self>, ArrowError> {
        // short rows are padded with nulls; long rows are still an error
        let format = Format::default()
            .with_header(true)
            .with_truncated_rows(true);
        let (schema, _) = format.infer_schema(data, None)?;
        if schema.fields().is_empty() {
            return Ok(None);
        }

        let schema: SchemaRef = Arc::new(dedup_column_names(&schema));
        let reader = ReaderBuilder::new(schema.clone())
            .with_header(true)
            .with_truncated_rows(true)
            .with_batch_size(CSV_BATCH_SIZE)
            .build(data)?;
        let batches = reader.collect::<Result<Vec<_>, _>>()?;
        let batch = concat_batches(&schema, &batches)?;

        Ok(Some(Self { batch }))
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Materialise every row as [`Cell`]s, in column order.
    ///
    /// Integers, floats and booleans keep their type; everything else
    /// (strings, dates, timestamps) is rendered as text.
    pub fn rows(&self) -> Result<Vec<Vec<Cell>>, ArrowError> {
        let columns = self
            .batch
            .columns()
            .iter()
            .map(|col| column_cells(col.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = vec![Vec::with_capacity(columns.len()); self.num_rows()];
        for column in columns {
            for (row, cell) in rows.iter_mut().zip(column) {
                row.push(cell);
            }
        }
        Ok(rows)
    }
}

/// Rename repeated header names to `name.1`, `name.2`, ... left to right,
/// skipping any name an earlier column already holds.
fn dedup_column_names(schema: &Schema) -> Schema {
    let mut taken: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let fields = schema
        .fields()
        .iter()
        .map(|f| {
            let base = f.name().clone();
            let mut name = base.clone();
            if taken.contains(&name) {
                let n = counts.entry(base.clone()).or_insert(0);
                loop {
                    *n += 1;
                    name = format!("{}.{}", base, n);
                    if !taken.contains(&name) {
                        break;
                    }
                }
            }
            taken.insert(name.clone());
            f.as_ref().clone().with_name(name)
        })
        .collect::<Vec<_>>();
    Schema::new(fields)
}

fn column_cells(col: &dyn Array) -> Result<Vec<Cell>, ArrowError> {
    let cells = match col.data_type() {
        DataType::Null => vec![Cell::Null; col.len()],
        DataType::Int8 => {
            let a = col.as_primitive::<Int8Type>();
            collect(col, |i| Cell::Int(a.value(i).into()))
        }
        DataType::Int16 => {
            let a = col.as_primitive::<Int16Type>();
            collect(col, |i| Cell::Int(a.value(i).into()))
        }
        DataType::Int32 => {
            let a = col.as_primitive::<Int32Type>();
            collect(col, |i| Cell::Int(a.value(i).into()))
        }
        DataType::Int64 => {
            let a = col.as_primitive::<Int64Type>();
            collect(col, |i| Cell::Int(a.value(i)))
        }
        DataType::Float32 => {
            let a = col.as_primitive::<Float32Type>();
            collect(col, |i| Cell::Float(a.value(i).into()))
        }
        DataType::Float64 => {
            let a = col.as_primitive::<Float64Type>();
            collect(col, |i| Cell::Float(a.value(i)))
        }
        DataType::Boolean => {
            let a = col.as_boolean();
            collect(col, |i| Cell::Bool(a.value(i)))
        }
        DataType::Utf8 => {
            let a = col.as_string::<i32>();
            collect(col, |i| Cell::Text(a.value(i).to_string()))
        }
        // dates, timestamps and anything else the reader may infer
        _ => {
            let formatter = ArrayFormatter::try_new(col, &FormatOptions::default())?;
            collect(col, |i| Cell::Text(formatter.value(i).to_string()))
        }
    };
    Ok(cells)
}

fn collect(col: &dyn Array, value: impl Fn(usize) -> Cell) -> Vec<Cell> {
    (0..col.len())
        .map(|i| if col.is_null(i) { Cell::Null } else { value(i) })
        .collect()
}
