//! Report orchestration.
//!
//! [`StatsReport`] ties the pipeline together: convert the input, classify its
//! columns, plan and execute one batched query, reshape the result and format
//! it into a [`StatsTable`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use showstats::report::{StatsReport, TableType, TopValuesLayout};
//! use serde_json::json;
//!
//! # async fn example() -> showstats::Result<()> {
//! let data = json!({"city": ["Oslo", "Oslo", "Rome"], "temp": [3.5, 4.0, 17.25]});
//!
//! StatsReport::summary()
//!     .with_table_type(TableType::Numeric)
//!     .show(&data)
//!     .await?;
//!
//! let table = StatsReport::categorical()
//!     .with_layout(TopValuesLayout::Spread { k: 2 })
//!     .with_top_cols(["city"])
//!     .make_table(&data)
//!     .await?;
//! assert_eq!(table.cell("city", "Top 1"), Some("Oslo (67%)"));
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::str::FromStr;
use std::time::Instant;
use tracing::{info, instrument};

use crate::classifier::{Classification, VarType};
use crate::dataset::{Dataset, IntoDataset};
use crate::error::{ErrorContext, Result, StatsError};
use crate::executor::StatsExecutor;
use crate::format::{
    format_stat, format_top_value, null_share_label, pin_order, variable_header, EMPTY_TOP_VALUE,
};
use crate::logging::LogConfig;
use crate::planner::{FunctionSet, StatFunction, StatPlan};
use crate::presenter::{DisplayConfig, MarkdownFormatter, TableFormatter};
use crate::reshape::{reshape, BucketStats, ColumnStats};
use crate::table::StatsTable;
use crate::value::StatValue;

/// Number of most frequent values shown per categorical column by default.
pub const DEFAULT_TOP_K: usize = 3;

const SUMMARY_FUNCTIONS: [StatFunction; 6] = [
    StatFunction::NullCount,
    StatFunction::Mean,
    StatFunction::Median,
    StatFunction::Std,
    StatFunction::Min,
    StatFunction::Max,
];

/// Which buckets a summary report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableType {
    /// Every bucket.
    #[default]
    All,
    /// Float, integer and boolean columns.
    Numeric,
    /// String columns.
    Categorical,
}

impl TableType {
    pub fn var_types(&self) -> Vec<VarType> {
        match self {
            TableType::All => VarType::ALL.to_vec(),
            TableType::Numeric => VarType::NUMERIC.to_vec(),
            TableType::Categorical => vec![VarType::Categorical],
        }
    }
}

impl FromStr for TableType {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(TableType::All),
            "num" => Ok(TableType::Numeric),
            "cat" => Ok(TableType::Categorical),
            other => Err(StatsError::configuration(format!(
                "unknown table type '{other}', expected one of all, num, cat"
            ))),
        }
    }
}

/// How most frequent values are laid out in the categorical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopValuesLayout {
    /// One `Top values` cell holding up to `k` lines.
    Stacked { k: usize },
    /// One `Top 1` .. `Top k` cell per rank.
    Spread { k: usize },
}

impl TopValuesLayout {
    pub fn k(&self) -> usize {
        match self {
            TopValuesLayout::Stacked { k } | TopValuesLayout::Spread { k } => *k,
        }
    }

    fn labels(&self) -> Vec<String> {
        match self {
            TopValuesLayout::Stacked { .. } => vec![StatFunction::TopValues.label().to_string()],
            TopValuesLayout::Spread { k } => (1..=*k).map(|rank| format!("Top {rank}")).collect(),
        }
    }
}

impl Default for TopValuesLayout {
    fn default() -> Self {
        TopValuesLayout::Stacked { k: DEFAULT_TOP_K }
    }
}

/// The two table shapes a report can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// One row per column with null share, moments and extremes.
    Summary,
    /// One row per categorical column with distinct count and top values.
    Categorical(TopValuesLayout),
}

/// A configured statistics report.
#[derive(Debug, Clone)]
pub struct StatsReport {
    kind: TableKind,
    var_types: Vec<VarType>,
    top_cols: Vec<String>,
    display: DisplayConfig,
    log_config: LogConfig,
}

impl Default for StatsReport {
    fn default() -> Self {
        Self::summary()
    }
}

impl StatsReport {
    /// A summary table over every bucket.
    pub fn summary() -> Self {
        Self {
            kind: TableKind::Summary,
            var_types: VarType::ALL.to_vec(),
            top_cols: Vec::new(),
            display: DisplayConfig::default(),
            log_config: LogConfig::default(),
        }
    }

    /// A categorical detail table with the three most frequent values stacked.
    pub fn categorical() -> Self {
        Self {
            kind: TableKind::Categorical(TopValuesLayout::default()),
            var_types: vec![VarType::Categorical],
            ..Self::summary()
        }
    }

    /// Restricts a summary report to the buckets of `table_type`.
    pub fn with_table_type(mut self, table_type: TableType) -> Self {
        self.var_types = table_type.var_types();
        self
    }

    /// Restricts a summary report to explicit buckets.
    ///
    /// Categorical reports always cover the categorical bucket only.
    pub fn with_var_types(mut self, var_types: impl IntoIterator<Item = VarType>) -> Self {
        self.var_types = var_types.into_iter().collect();
        self
    }

    /// Pins the named columns to the top of the table, in the order given.
    pub fn with_top_cols<I, S>(mut self, top_cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.top_cols = top_cols.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the top-values layout and turns the report into a categorical one.
    pub fn with_layout(mut self, layout: TopValuesLayout) -> Self {
        self.kind = TableKind::Categorical(layout);
        self.var_types = vec![VarType::Categorical];
        self
    }

    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    fn wanted(&self) -> Vec<VarType> {
        match self.kind {
            TableKind::Summary => self.var_types.clone(),
            TableKind::Categorical(_) => vec![VarType::Categorical],
        }
    }

    /// The message printed when no column matches the selection.
    pub fn empty_message(&self) -> &'static str {
        let wanted = self.wanted();
        if wanted == [VarType::Categorical] {
            "No categorical columns found"
        } else if !wanted.is_empty() && wanted.iter().all(VarType::is_numeric) {
            "No numerical columns found"
        } else {
            "No columns found"
        }
    }

    /// Computes the statistics table.
    ///
    /// Returns an empty table when no column matches the selected buckets.
    #[instrument(skip(self, data), fields(kind = ?self.kind))]
    pub async fn make_table(&self, data: impl IntoDataset) -> Result<StatsTable> {
        let start = Instant::now();
        let dataset: Dataset = data.into_dataset().await?;
        dataset.validate_non_empty()?;

        let classification = Classification::classify(&dataset.schema(), &self.wanted())?;
        if classification.is_empty() {
            info!(columns = dataset.num_columns(), "No columns match the selected buckets");
            return Ok(StatsTable::empty());
        }

        let (set, top_k) = match self.kind {
            TableKind::Summary => (FunctionSet::Summary, 0),
            TableKind::Categorical(layout) => (FunctionSet::Detail, layout.k()),
        };
        let plan = StatPlan::build(&classification, set);
        crate::perf_debug!(
            self.log_config,
            columns = classification.column_count(),
            aggregates = plan.aggregates().len(),
            top_value_columns = plan.top_value_columns().len(),
            "Planned statistics"
        );
        let row = StatsExecutor::new()
            .with_log_config(self.log_config.clone())
            .execute(&dataset, &plan, top_k)
            .await?;
        let buckets = reshape(&classification, set, &row)?;

        let rows = dataset.num_rows();
        let mut table = match self.kind {
            TableKind::Summary => summary_table(&buckets, rows),
            TableKind::Categorical(layout) => categorical_table(&buckets, rows, layout),
        };

        if !self.top_cols.is_empty() {
            let order = pin_order(&table.variables(), &self.top_cols);
            table.reorder_rows(&order);
        }

        if self.log_config.log_timings {
            info!(
                rows,
                columns = classification.column_count(),
                time_ms = start.elapsed().as_millis() as u64,
                "Built statistics table"
            );
        }
        Ok(table)
    }

    /// Renders the table as text, or the empty-selection message.
    pub async fn render(&self, data: impl IntoDataset) -> Result<String> {
        let table = self.make_table(data).await?;
        if table.is_empty() {
            return Ok(format!("{}\n", self.empty_message()));
        }
        MarkdownFormatter::new(self.display.clone()).format(&table)
    }

    /// Prints the rendered table to standard output.
    pub async fn show(&self, data: impl IntoDataset) -> Result<()> {
        let text = self.render(data).await?;
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|()| stdout.flush())
            .context("Failed to print statistics table")
    }
}

fn summary_table(buckets: &[BucketStats], rows: usize) -> StatsTable {
    let has_categorical = buckets.iter().any(|b| b.var_type == VarType::Categorical);

    let mut functions = SUMMARY_FUNCTIONS.to_vec();
    if has_categorical {
        functions.push(StatFunction::NUnique);
    }
    let mut labels = vec![variable_header(rows)];
    labels.extend(functions.iter().map(|f| f.label().to_string()));

    let mut table = StatsTable::new(labels);
    for bucket in buckets {
        for column in &bucket.columns {
            let mut cells = vec![column.name.clone()];
            cells.extend(functions.iter().map(|&f| stat_cell(column, f, rows)));
            table.push_row(cells);
        }
    }
    table
}

fn categorical_table(buckets: &[BucketStats], rows: usize, layout: TopValuesLayout) -> StatsTable {
    let mut labels = vec![
        variable_header(rows),
        StatFunction::NullCount.label().to_string(),
        StatFunction::NUnique.label().to_string(),
    ];
    labels.extend(layout.labels());

    let mut table = StatsTable::new(labels);
    for bucket in buckets {
        for column in &bucket.columns {
            let mut cells = vec![
                column.name.clone(),
                stat_cell(column, StatFunction::NullCount, rows),
                stat_cell(column, StatFunction::NUnique, rows),
            ];
            let entries: Vec<String> = match column.get(StatFunction::TopValues) {
                Some(StatValue::TopValues(values)) => values
                    .iter()
                    .take(layout.k())
                    .map(|entry| format_top_value(entry, rows))
                    .collect(),
                _ => Vec::new(),
            };
            match layout {
                TopValuesLayout::Stacked { .. } => cells.push(entries.join("\n")),
                TopValuesLayout::Spread { k } => cells.extend(
                    (0..k).map(|rank| {
                        entries
                            .get(rank)
                            .cloned()
                            .unwrap_or_else(|| EMPTY_TOP_VALUE.to_string())
                    }),
                ),
            }
            table.push_row(cells);
        }
    }
    table
}

fn stat_cell(column: &ColumnStats, function: StatFunction, rows: usize) -> String {
    match (function, column.get(function)) {
        (_, None) => String::new(),
        (StatFunction::NullCount, Some(value)) => {
            null_share_label(value.as_count().unwrap_or(0), rows)
        }
        (_, Some(value)) => format_stat(column.var_type, function, value),
    }
}
