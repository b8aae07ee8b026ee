//! Error types for the showstats library.
//!
//! Every fallible operation in this crate returns [`StatsError`]. Errors fall
//! into three groups:
//!
//! - **Input validation**: the dataset is empty ([`StatsError::EmptyDataset`])
//!   or contains a column whose type has no bucket
//!   ([`StatsError::UnsupportedType`]).
//! - **Configuration**: an unknown bucket tag or table selector was supplied
//!   ([`StatsError::Configuration`]).
//! - **Conversion**: a value could not be turned into a [`Dataset`](crate::dataset::Dataset)
//!   ([`StatsError::Conversion`]).
//!
//! Engine failures surface unchanged through the `DataFusion` and `Arrow`
//! variants. Nothing is retried; the first error aborts the report.

use arrow::datatypes::DataType;
use thiserror::Error;

/// The main error type for the showstats library.
#[derive(Error, Debug)]
pub enum StatsError {
    /// The dataset has no rows or no columns.
    #[error("Input dataset must have rows and columns (got {rows} rows, {columns} columns)")]
    EmptyDataset { rows: usize, columns: usize },

    /// An invalid bucket tag, table type or option was supplied.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A value could not be converted into a dataset.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Human-readable description of what could not be converted
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A column's declared type does not belong to any variable-type bucket.
    #[error("Column '{column}' has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: DataType },

    /// The aggregate query result did not contain an expected statistic.
    #[error("Statistic '{0}' missing from query result")]
    MissingStatistic(String),

    /// Error from DataFusion operations.
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error while writing the rendered table.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while serializing a table.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, StatsError>`.
pub type Result<T> = std::result::Result<T, StatsError>;

impl StatsError {
    /// Creates a configuration error with the given message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a conversion error without an underlying cause.
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a conversion error wrapping the error that caused it.
    pub fn conversion_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Conversion {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates an internal error with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true for errors caused by the caller's input rather than the engine.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyDataset { .. }
                | Self::Configuration(_)
                | Self::Conversion { .. }
                | Self::UnsupportedType { .. }
        )
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<StatsError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.with_context(|| msg.to_string())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            StatsError::Internal(inner) => StatsError::Internal(format!("{}: {}", f(), inner)),
            other => StatsError::Internal(format!("{}: {}", f(), other)),
        })
    }
}
