//! In-memory datasets and conversion into them.
//!
//! A [`Dataset`] is an Arrow schema plus the record batches that share it. It
//! is what every report runs over. Values that can become a dataset implement
//! [`IntoDataset`]; conversion failures are returned as
//! [`StatsError::Conversion`].

use arrow::array::ArrayRef;
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use arrow::json::reader::{infer_json_schema_from_iterator, ReaderBuilder};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use datafusion::datasource::MemTable;
use datafusion::prelude::{DataFrame, SessionConfig, SessionContext};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{Result, StatsError};
use crate::planner::TABLE_NAME;

/// A rectangular in-memory table.
///
/// Cloning is cheap: the underlying arrays are reference counted.
#[derive(Debug, Clone)]
pub struct Dataset {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
}

impl Dataset {
    /// Creates a dataset from a schema and batches that all carry it.
    pub fn try_new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        for (idx, batch) in batches.iter().enumerate() {
            if batch.schema().fields() != schema.fields() {
                return Err(StatsError::conversion(format!(
                    "record batch {idx} does not match the dataset schema"
                )));
            }
        }
        Ok(Self { schema, batches })
    }

    /// Wraps a single record batch.
    pub fn from_batch(batch: RecordBatch) -> Self {
        Self {
            schema: batch.schema(),
            batches: vec![batch],
        }
    }

    /// Builds a dataset from batches, taking the schema from the first one.
    ///
    /// An empty list has neither rows nor columns.
    pub fn from_batches(batches: Vec<RecordBatch>) -> Result<Self> {
        let schema = batches
            .first()
            .map(|batch| batch.schema())
            .ok_or(StatsError::EmptyDataset {
                rows: 0,
                columns: 0,
            })?;
        Self::try_new(schema, batches)
    }

    /// Builds a dataset from named columns of equal length.
    pub fn try_from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, ArrayRef)>,
        S: AsRef<str>,
    {
        let batch = RecordBatch::try_from_iter(columns).map_err(|e| {
            StatsError::conversion_with_source("columns do not form a table", e)
        })?;
        Ok(Self::from_batch(batch))
    }

    /// Builds a dataset from a JSON object mapping column names to arrays.
    ///
    /// Column types are inferred by Arrow's JSON reader. A column whose values
    /// are all `null` becomes a column of the null type.
    #[instrument(skip(value))]
    pub fn try_from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| StatsError::conversion("expected a JSON object of columns"))?;

        let mut columns: Vec<(&String, &Vec<Value>)> = Vec::with_capacity(object.len());
        for (name, column) in object {
            let values = column.as_array().ok_or_else(|| {
                StatsError::conversion(format!("column '{name}' is not a JSON array"))
            })?;
            columns.push((name, values));
        }

        let num_rows = columns.first().map(|(_, values)| values.len()).unwrap_or(0);
        if let Some((name, values)) = columns.iter().find(|(_, v)| v.len() != num_rows) {
            return Err(StatsError::conversion(format!(
                "column '{name}' has {} values, expected {num_rows}",
                values.len()
            )));
        }

        let rows: Vec<Value> = (0..num_rows)
            .map(|row| {
                let record: Map<String, Value> = columns
                    .iter()
                    .map(|(name, values)| ((*name).clone(), values[row].clone()))
                    .collect();
                Value::Object(record)
            })
            .collect();

        let schema = infer_json_schema_from_iterator(rows.iter().map(Ok::<_, ArrowError>))
            .map_err(|e| StatsError::conversion_with_source("could not infer column types", e))?;
        let schema = Arc::new(schema);
        debug!(fields = schema.fields().len(), rows = num_rows, "Inferred JSON schema");

        let mut decoder = ReaderBuilder::new(schema.clone())
            .with_batch_size(num_rows.max(1))
            .build_decoder()?;
        decoder
            .serialize(&rows)
            .map_err(|e| StatsError::conversion_with_source("could not decode JSON rows", e))?;
        let batches = decoder.flush()?.into_iter().collect();

        Self::try_new(schema, batches)
    }

    /// Collects a DataFusion DataFrame into memory.
    #[instrument(skip(df))]
    pub async fn from_dataframe(df: DataFrame) -> Result<Self> {
        let declared: SchemaRef = df.schema().inner().clone();
        let batches = df.collect().await?;
        let schema = batches
            .first()
            .map(|batch| batch.schema())
            .unwrap_or(declared);
        debug!(batches = batches.len(), "Collected DataFrame");
        Self::try_new(schema, batches)
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|batch| batch.num_rows()).sum()
    }

    pub fn num_columns(&self) -> usize {
        self.schema.fields().len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }

    /// Fails with [`StatsError::EmptyDataset`] unless there are rows and columns.
    pub fn validate_non_empty(&self) -> Result<()> {
        let (rows, columns) = (self.num_rows(), self.num_columns());
        if rows == 0 || columns == 0 {
            return Err(StatsError::EmptyDataset { rows, columns });
        }
        Ok(())
    }

    /// Creates a fresh single-partition session with the dataset registered.
    pub(crate) fn session_context(&self) -> Result<SessionContext> {
        let ctx = SessionContext::new_with_config(SessionConfig::new().with_target_partitions(1));
        let table = MemTable::try_new(self.schema.clone(), vec![self.batches.clone()])?;
        ctx.register_table(TABLE_NAME, Arc::new(table))?;
        Ok(ctx)
    }
}

/// Conversion of a value into a [`Dataset`].
#[async_trait]
pub trait IntoDataset: Send {
    async fn into_dataset(self) -> Result<Dataset>;
}

#[async_trait]
impl IntoDataset for Dataset {
    async fn into_dataset(self) -> Result<Dataset> {
        Ok(self)
    }
}

#[async_trait]
impl<'a> IntoDataset for &'a Dataset {
    async fn into_dataset(self) -> Result<Dataset> {
        Ok(self.clone())
    }
}

#[async_trait]
impl IntoDataset for RecordBatch {
    async fn into_dataset(self) -> Result<Dataset> {
        Ok(Dataset::from_batch(self))
    }
}

#[async_trait]
impl IntoDataset for Vec<RecordBatch> {
    async fn into_dataset(self) -> Result<Dataset> {
        Dataset::from_batches(self)
    }
}

#[async_trait]
impl IntoDataset for DataFrame {
    async fn into_dataset(self) -> Result<Dataset> {
        Dataset::from_dataframe(self).await
    }
}

#[async_trait]
impl IntoDataset for Value {
    async fn into_dataset(self) -> Result<Dataset> {
        Dataset::try_from_json(&self)
    }
}

#[async_trait]
impl<'a> IntoDataset for &'a Value {
    async fn into_dataset(self) -> Result<Dataset> {
        Dataset::try_from_json(self)
    }
}
