//! # showstats - summary statistics tables for Arrow data
//!
//! showstats computes per-column summary statistics (share of missing values,
//! mean, median, standard deviation, extremes, distinct counts and most
//! frequent values) over an in-memory dataset and renders them as a compact
//! text table grouped by variable type.
//!
//! Every statistic is computed by DataFusion's built-in aggregate functions in
//! a single batched query; showstats only classifies columns, plans the query
//! and formats the result.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//!
//! # async fn example() -> showstats::Result<()> {
//! let data = json!({
//!     "flt_col": [1.3, 1.9],
//!     "str_col": ["a", null],
//! });
//!
//! // Print the overview table
//! showstats::show_stats(&data, &[]).await?;
//!
//! // Or keep the table for further use
//! let table = showstats::make_stats_table(&data, &["str_col"]).await?;
//! assert_eq!(table.cell("flt_col", "Mean"), Some("1.6"));
//! # Ok(())
//! # }
//! ```
//!
//! Output:
//!
//! ```text
//! | Var; N = 2 | Null % | Mean | Median | Std. | Min | Max | N uniq. |
//! |------------|--------|------|--------|------|-----|-----|---------|
//! | flt_col    | 0%     | 1.6  | 1.6    | 0.42 | 1.3 | 1.9 |         |
//! | str_col    | <60%   |      |        |      | a   | a   | 1       |
//! ```
//!
//! ## Variable types
//!
//! Columns are grouped into buckets by declared type, shown in this order:
//!
//! | Bucket      | Arrow types                         | Statistics                              |
//! |-------------|-------------------------------------|-----------------------------------------|
//! | `num_float` | floats, decimals                    | null %, mean, median, std, min, max     |
//! | `num_int`   | signed and unsigned integers        | null %, mean, median, std, min, max     |
//! | `num_bool`  | boolean                             | null %, mean, median, std, min, max     |
//! | `datetime`  | timestamps                          | null %, mean, median, min, max          |
//! | `date`      | dates                               | null %, min, max                        |
//! | `cat`       | strings, dictionary-encoded strings | null %, min, max, distinct count        |
//! | `null`      | null type                           | null %                                  |
//!
//! Columns of any other type are rejected with [`StatsError::UnsupportedType`].
//!
//! ## Configuration
//!
//! [`StatsReport`] exposes every option: bucket selection, pinned rows, the
//! top-values layout of the categorical table and the [`DisplayConfig`] used
//! for rendering.
//!
//! ## Logging
//!
//! showstats emits `tracing` events; generated SQL is logged at debug level.
//! See [`logging::setup::init_logging`] for a ready-made subscriber.

pub mod classifier;
pub mod dataset;
pub mod error;
pub mod executor;
pub mod format;
pub mod logging;
pub mod planner;
pub mod prelude;
pub mod presenter;
pub mod report;
pub mod reshape;
pub mod table;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;

pub use classifier::VarType;
pub use dataset::{Dataset, IntoDataset};
pub use error::{Result, StatsError};
pub use presenter::DisplayConfig;
pub use report::{StatsReport, TableType, TopValuesLayout};
pub use table::StatsTable;

/// Prints the overview table of every column.
///
/// `top_cols` are pinned to the top of the table in the order given.
pub async fn show_stats(data: impl IntoDataset, top_cols: &[&str]) -> Result<()> {
    StatsReport::summary()
        .with_top_cols(top_cols.iter().copied())
        .show(data)
        .await
}

/// Prints the categorical table with the three most frequent values per column.
pub async fn show_cat_stats(data: impl IntoDataset, top_cols: &[&str]) -> Result<()> {
    StatsReport::categorical()
        .with_top_cols(top_cols.iter().copied())
        .show(data)
        .await
}

/// Returns the overview table of every column.
pub async fn make_stats_table(data: impl IntoDataset, top_cols: &[&str]) -> Result<StatsTable> {
    StatsReport::summary()
        .with_top_cols(top_cols.iter().copied())
        .make_table(data)
        .await
}

/// Returns the categorical table.
pub async fn make_cat_stats_table(data: impl IntoDataset, top_cols: &[&str]) -> Result<StatsTable> {
    StatsReport::categorical()
        .with_top_cols(top_cols.iter().copied())
        .make_table(data)
        .await
}
