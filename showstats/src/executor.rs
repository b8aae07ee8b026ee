//! Batched execution of a [`StatPlan`].
//!
//! All scalar statistics come back from one aggregate query as a single wide
//! row. Top values, when planned, come from one more query covering every
//! categorical column. The executor never issues per-column queries.

use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use datafusion::prelude::SessionContext;
use datafusion::scalar::ScalarValue;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, instrument};

use crate::dataset::Dataset;
use crate::error::{Result, StatsError};
use crate::logging::{truncate_field, LogConfig};
use crate::planner::{alias, StatFunction, StatPlan};
use crate::value::{StatValue, ValueCount};

/// Every computed statistic, keyed by alias.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatRow {
    values: HashMap<String, StatValue>,
}

impl StatRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, alias: impl Into<String>, value: StatValue) {
        self.values.insert(alias.into(), value);
    }

    /// Looks up a statistic by its alias.
    pub fn get(&self, alias: &str) -> Option<&StatValue> {
        self.values.get(alias)
    }

    /// Looks up a statistic by column and function.
    pub fn stat(&self, column: &str, function: StatFunction) -> Option<&StatValue> {
        self.values.get(&alias(column, function))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Runs statistic plans against a dataset.
#[derive(Debug, Clone, Default)]
pub struct StatsExecutor {
    log_config: LogConfig,
}

impl StatsExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Executes the plan and collects every statistic into one [`StatRow`].
    ///
    /// `top_k` bounds the length of each top-values list.
    #[instrument(skip(self, dataset, plan), fields(aggregates = plan.aggregates().len()))]
    pub async fn execute(&self, dataset: &Dataset, plan: &StatPlan, top_k: usize) -> Result<StatRow> {
        let start = Instant::now();
        let ctx = dataset.session_context()?;
        let mut row = StatRow::new();

        if let Some(sql) = plan.aggregate_sql() {
            let batches = self.run(&ctx, &sql).await?;
            extract_single_row(&batches, &mut row)?;
        }

        if let Some(sql) = plan.top_values_sql() {
            let batches = self.run(&ctx, &sql).await?;
            let ranked = rank_top_values(&batches, plan.top_value_columns().len(), top_k)?;
            for (column, values) in plan.top_value_columns().iter().zip(ranked) {
                row.insert(alias(column, StatFunction::TopValues), StatValue::TopValues(values));
            }
        }

        if self.log_config.log_timings {
            info!(
                statistics = row.len(),
                rows = dataset.num_rows(),
                time_ms = start.elapsed().as_millis() as u64,
                "Computed statistics"
            );
        }
        Ok(row)
    }

    async fn run(&self, ctx: &SessionContext, sql: &str) -> Result<Vec<RecordBatch>> {
        crate::log_query!(
            self.log_config,
            sql = %truncate_field(sql, self.log_config.max_field_length),
            "Executing statistics query"
        );
        let batches = ctx.sql(sql).await?.collect().await?;
        Ok(batches)
    }
}

/// Copies the one result row into `row`, keyed by output column name.
fn extract_single_row(batches: &[RecordBatch], row: &mut StatRow) -> Result<()> {
    let total: usize = batches.iter().map(|b| b.num_rows()).sum();
    if total != 1 {
        return Err(StatsError::internal(format!(
            "aggregate query returned {total} rows, expected exactly one"
        )));
    }
    let batch = batches
        .iter()
        .find(|b| b.num_rows() == 1)
        .ok_or_else(|| StatsError::internal("aggregate result batch missing"))?;

    for (field, column) in batch.schema().fields().iter().zip(batch.columns()) {
        let scalar = ScalarValue::try_from_array(column.as_ref(), 0)?;
        row.insert(field.name().clone(), StatValue::from_scalar(&scalar)?);
    }
    Ok(())
}

/// Orders the frequency rows per column and keeps the `k` most frequent.
///
/// Ties are broken by first appearance in the dataset.
fn rank_top_values(batches: &[RecordBatch], columns: usize, k: usize) -> Result<Vec<Vec<ValueCount>>> {
    let mut per_column: Vec<Vec<(String, u64, u64)>> = vec![Vec::new(); columns];

    for batch in batches {
        if batch.num_columns() != 4 {
            return Err(StatsError::internal(format!(
                "frequency query returned {} columns, expected 4",
                batch.num_columns()
            )));
        }
        for idx in 0..batch.num_rows() {
            let column_index = scalar_u64(batch.column(0).as_ref(), idx, "column_index")? as usize;
            let value = scalar_string(batch.column(1).as_ref(), idx)?;
            let frequency = scalar_u64(batch.column(2).as_ref(), idx, "frequency")?;
            let first_row = scalar_u64(batch.column(3).as_ref(), idx, "first_row")?;

            let entries = per_column.get_mut(column_index).ok_or_else(|| {
                StatsError::internal(format!("frequency row for unknown column {column_index}"))
            })?;
            entries.push((value, frequency, first_row));
        }
    }

    Ok(per_column
        .into_iter()
        .map(|mut entries| {
            entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
            entries
                .into_iter()
                .take(k)
                .map(|(value, count, _)| ValueCount::new(value, count))
                .collect()
        })
        .collect())
}

fn scalar_u64(array: &dyn Array, idx: usize, name: &str) -> Result<u64> {
    match ScalarValue::try_from_array(array, idx)? {
        ScalarValue::Int64(Some(v)) => u64::try_from(v)
            .map_err(|_| StatsError::internal(format!("negative {name}: {v}"))),
        ScalarValue::UInt64(Some(v)) => Ok(v),
        ScalarValue::Int32(Some(v)) => u64::try_from(v)
            .map_err(|_| StatsError::internal(format!("negative {name}: {v}"))),
        ScalarValue::UInt32(Some(v)) => Ok(u64::from(v)),
        other => Err(StatsError::internal(format!(
            "expected integer for {name}, got {other:?}"
        ))),
    }
}

fn scalar_string(array: &dyn Array, idx: usize) -> Result<String> {
    match ScalarValue::try_from_array(array, idx)? {
        ScalarValue::Utf8(Some(v))
        | ScalarValue::LargeUtf8(Some(v))
        | ScalarValue::Utf8View(Some(v)) => Ok(v),
        other => Err(StatsError::internal(format!(
            "expected string value, got {other:?}"
        ))),
    }
}
