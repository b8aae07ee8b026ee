//! Values produced by the statistics query.

use arrow::temporal_conversions::{date32_to_datetime, date64_to_datetime};
use chrono::{NaiveDate, NaiveDateTime};
use datafusion::scalar::ScalarValue;
use serde::Serialize;
use std::fmt;

use crate::error::{Result, StatsError};

/// A single statistic for a single column.
///
/// Scalar variants mirror what the engine's aggregates return; `TopValues`
/// carries the ranked frequency list of a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum StatValue {
    /// SQL NULL, e.g. the mean of an all-null column.
    Null,

    /// An integer result (counts, integer min/max, raw timestamps).
    Int(i128),

    /// A floating-point result (mean, median, std, float min/max).
    Float(f64),

    /// A boolean result (boolean min/max).
    Bool(bool),

    /// A textual result (categorical min/max).
    Text(String),

    /// A calendar date.
    Date(NaiveDate),

    /// A wall-clock timestamp in UTC.
    Datetime(NaiveDateTime),

    /// Most frequent values with their counts, most frequent first.
    TopValues(Vec<ValueCount>),
}

/// One entry of a top-values list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

impl ValueCount {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

impl StatValue {
    /// Converts an aggregate result scalar into a statistic value.
    pub fn from_scalar(scalar: &ScalarValue) -> Result<Self> {
        if scalar.is_null() {
            return Ok(StatValue::Null);
        }

        let value = match scalar {
            ScalarValue::Boolean(Some(v)) => StatValue::Bool(*v),
            ScalarValue::Float32(Some(v)) => StatValue::Float(f64::from(*v)),
            ScalarValue::Float64(Some(v)) => StatValue::Float(*v),
            ScalarValue::Int8(Some(v)) => StatValue::Int(i128::from(*v)),
            ScalarValue::Int16(Some(v)) => StatValue::Int(i128::from(*v)),
            ScalarValue::Int32(Some(v)) => StatValue::Int(i128::from(*v)),
            ScalarValue::Int64(Some(v)) => StatValue::Int(i128::from(*v)),
            ScalarValue::UInt8(Some(v)) => StatValue::Int(i128::from(*v)),
            ScalarValue::UInt16(Some(v)) => StatValue::Int(i128::from(*v)),
            ScalarValue::UInt32(Some(v)) => StatValue::Int(i128::from(*v)),
            ScalarValue::UInt64(Some(v)) => StatValue::Int(i128::from(*v)),
            ScalarValue::Utf8(Some(v))
            | ScalarValue::LargeUtf8(Some(v))
            | ScalarValue::Utf8View(Some(v)) => StatValue::Text(v.clone()),
            ScalarValue::Date32(Some(days)) => date32_to_datetime(*days)
                .map(|dt| StatValue::Date(dt.date()))
                .ok_or_else(|| StatsError::internal(format!("date out of range: {days}")))?,
            ScalarValue::Date64(Some(ms)) => date64_to_datetime(*ms)
                .map(|dt| StatValue::Date(dt.date()))
                .ok_or_else(|| StatsError::internal(format!("date out of range: {ms}")))?,
            other => {
                return Err(StatsError::internal(format!(
                    "unexpected aggregate result type {}",
                    other.data_type()
                )))
            }
        };
        Ok(value)
    }

    /// Checks if the value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, StatValue::Null)
    }

    /// Attempts to get the numeric value as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Float(v) => Some(*v),
            StatValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Attempts to get the value as a non-negative count.
    pub fn as_count(&self) -> Option<u64> {
        match self {
            StatValue::Int(v) => u64::try_from(*v).ok(),
            // An empty input makes SUM return NULL
            StatValue::Null => Some(0),
            _ => None,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Null => Ok(()),
            StatValue::Int(v) => write!(f, "{v}"),
            StatValue::Float(v) => write!(f, "{v:?}"),
            StatValue::Bool(v) => write!(f, "{v}"),
            StatValue::Text(v) => f.write_str(v),
            StatValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            StatValue::Datetime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            StatValue::TopValues(values) => {
                let parts: Vec<String> = values
                    .iter()
                    .map(|vc| format!("{} ({})", vc.value, vc.count))
                    .collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

impl From<f64> for StatValue {
    fn from(value: f64) -> Self {
        StatValue::Float(value)
    }
}

impl From<i64> for StatValue {
    fn from(value: i64) -> Self {
        StatValue::Int(i128::from(value))
    }
}

impl From<bool> for StatValue {
    fn from(value: bool) -> Self {
        StatValue::Bool(value)
    }
}

impl From<&str> for StatValue {
    fn from(value: &str) -> Self {
        StatValue::Text(value.to_string())
    }
}
