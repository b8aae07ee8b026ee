//! Column classification by declared type.
//!
//! Every column of a dataset belongs to exactly one [`VarType`] bucket. The
//! bucket decides which statistics are computed for the column and under which
//! heading it is displayed.

use arrow::datatypes::{DataType, Schema, TimeUnit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StatsError};

/// The variable type of a column.
///
/// The declaration order is the canonical display order of the buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarType {
    /// Floating-point and decimal columns.
    NumFloat,
    /// Signed and unsigned integer columns.
    NumInt,
    /// Boolean columns.
    NumBool,
    /// Timestamp columns.
    Datetime,
    /// Calendar date columns.
    Date,
    /// String columns.
    #[serde(rename = "cat")]
    Categorical,
    /// Columns whose declared type is the null type.
    Null,
}

impl VarType {
    /// All buckets in canonical order.
    pub const ALL: [VarType; 7] = [
        VarType::NumFloat,
        VarType::NumInt,
        VarType::NumBool,
        VarType::Datetime,
        VarType::Date,
        VarType::Categorical,
        VarType::Null,
    ];

    /// Buckets shown in a numeric-only report.
    pub const NUMERIC: [VarType; 3] = [VarType::NumFloat, VarType::NumInt, VarType::NumBool];

    /// Returns the textual tag of the bucket.
    pub fn tag(&self) -> &'static str {
        match self {
            VarType::NumFloat => "num_float",
            VarType::NumInt => "num_int",
            VarType::NumBool => "num_bool",
            VarType::Datetime => "datetime",
            VarType::Date => "date",
            VarType::Categorical => "cat",
            VarType::Null => "null",
        }
    }

    /// Returns true for the three numeric buckets.
    pub fn is_numeric(&self) -> bool {
        matches!(self, VarType::NumFloat | VarType::NumInt | VarType::NumBool)
    }

    /// Classifies a declared Arrow type.
    ///
    /// Returns `None` when the type has no bucket.
    pub fn of(data_type: &DataType) -> Option<VarType> {
        match data_type {
            DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _) => Some(VarType::NumFloat),
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => Some(VarType::NumInt),
            DataType::Boolean => Some(VarType::NumBool),
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
                Some(VarType::Categorical)
            }
            DataType::Dictionary(_, value) => match value.as_ref() {
                DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
                    Some(VarType::Categorical)
                }
                _ => None,
            },
            DataType::Timestamp(_, _) => Some(VarType::Datetime),
            DataType::Date32 | DataType::Date64 => Some(VarType::Date),
            DataType::Null => Some(VarType::Null),
            _ => None,
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for VarType {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        VarType::ALL
            .into_iter()
            .find(|var_type| var_type.tag() == s)
            .ok_or_else(|| {
                StatsError::configuration(format!(
                    "unknown variable type '{s}', expected one of num_float, num_int, num_bool, cat, datetime, date, null"
                ))
            })
    }
}

/// A column's name and declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: DataType,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// The timestamp unit for datetime columns.
    pub fn time_unit(&self) -> Option<TimeUnit> {
        match &self.data_type {
            DataType::Timestamp(unit, _) => Some(*unit),
            _ => None,
        }
    }
}

/// Columns grouped by bucket, in canonical bucket order.
///
/// Buckets without columns are not present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    buckets: Vec<(VarType, Vec<ColumnInfo>)>,
}

impl Classification {
    /// Classifies every column of `schema` and keeps the buckets in `wanted`.
    ///
    /// Fails on the first column whose type has no bucket, whether or not
    /// that bucket was requested.
    pub fn classify(schema: &Schema, wanted: &[VarType]) -> Result<Self> {
        let mut all: Vec<(VarType, ColumnInfo)> = Vec::with_capacity(schema.fields().len());
        for field in schema.fields() {
            let var_type =
                VarType::of(field.data_type()).ok_or_else(|| StatsError::UnsupportedType {
                    column: field.name().clone(),
                    data_type: field.data_type().clone(),
                })?;
            all.push((
                var_type,
                ColumnInfo::new(field.name().clone(), field.data_type().clone()),
            ));
        }

        let buckets = VarType::ALL
            .into_iter()
            .filter(|var_type| wanted.contains(var_type))
            .filter_map(|var_type| {
                let columns: Vec<ColumnInfo> = all
                    .iter()
                    .filter(|(vt, _)| *vt == var_type)
                    .map(|(_, info)| info.clone())
                    .collect();
                (!columns.is_empty()).then_some((var_type, columns))
            })
            .collect();

        Ok(Self { buckets })
    }

    pub fn buckets(&self) -> &[(VarType, Vec<ColumnInfo>)] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Returns the columns of one bucket.
    pub fn columns(&self, var_type: VarType) -> &[ColumnInfo] {
        self.buckets
            .iter()
            .find(|(vt, _)| *vt == var_type)
            .map(|(_, columns)| columns.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, var_type: VarType) -> bool {
        self.buckets.iter().any(|(vt, _)| *vt == var_type)
    }

    pub fn column_count(&self) -> usize {
        self.buckets.iter().map(|(_, columns)| columns.len()).sum()
    }
}
