//! Reshaping the single wide result row into per-bucket tables.

use arrow::datatypes::TimeUnit;

use crate::classifier::{Classification, ColumnInfo, VarType};
use crate::error::{Result, StatsError};
use crate::executor::StatRow;
use crate::format::epoch_to_datetime;
use crate::planner::{alias, functions_for, FunctionSet, StatFunction};
use crate::value::StatValue;

/// The statistics of one column, in the bucket's function order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub var_type: VarType,
    pub stats: Vec<(StatFunction, StatValue)>,
}

impl ColumnStats {
    pub fn get(&self, function: StatFunction) -> Option<&StatValue> {
        self.stats
            .iter()
            .find(|(f, _)| *f == function)
            .map(|(_, value)| value)
    }
}

/// All columns of one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketStats {
    pub var_type: VarType,
    pub columns: Vec<ColumnStats>,
}

/// Splits `row` into one [`BucketStats`] per classified bucket.
///
/// Datetime statistics come back from the engine as epoch offsets and are
/// converted to timestamps here using each column's time unit.
pub fn reshape(
    classification: &Classification,
    set: FunctionSet,
    row: &StatRow,
) -> Result<Vec<BucketStats>> {
    classification
        .buckets()
        .iter()
        .map(|(var_type, columns)| {
            let columns = columns
                .iter()
                .map(|column| column_stats(*var_type, set, column, row))
                .collect::<Result<Vec<_>>>()?;
            Ok(BucketStats {
                var_type: *var_type,
                columns,
            })
        })
        .collect()
}

fn column_stats(
    var_type: VarType,
    set: FunctionSet,
    column: &ColumnInfo,
    row: &StatRow,
) -> Result<ColumnStats> {
    let stats = functions_for(var_type, set)
        .iter()
        .map(|&function| {
            let key = alias(&column.name, function);
            let value = row
                .get(&key)
                .cloned()
                .ok_or(StatsError::MissingStatistic(key))?;
            let value = match (var_type, function, column.time_unit()) {
                (VarType::Datetime, f, Some(unit)) if f != StatFunction::NullCount => {
                    to_datetime(value, unit)?
                }
                _ => value,
            };
            Ok((function, value))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ColumnStats {
        name: column.name.clone(),
        var_type,
        stats,
    })
}

fn to_datetime(value: StatValue, unit: TimeUnit) -> Result<StatValue> {
    let epoch = match value {
        StatValue::Int(v) => i64::try_from(v).ok(),
        StatValue::Float(v) if v.is_finite() => Some(v.floor() as i64),
        StatValue::Null => return Ok(StatValue::Null),
        other => {
            return Err(StatsError::internal(format!(
                "unexpected datetime statistic {other:?}"
            )))
        }
    };
    epoch
        .and_then(|epoch| epoch_to_datetime(epoch, unit))
        .map(StatValue::Datetime)
        .ok_or_else(|| StatsError::internal("timestamp statistic out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{DataType, Field, Schema};

    fn classification() -> Classification {
        let schema = Schema::new(vec![
            Field::new("x", DataType::Int64, true),
            Field::new("ts", DataType::Timestamp(TimeUnit::Second, None), true),
        ]);
        Classification::classify(&schema, &VarType::ALL).unwrap()
    }

    fn full_row() -> StatRow {
        let mut row = StatRow::new();
        row.insert("x____null_count", StatValue::Int(0));
        row.insert("x____mean", StatValue::Float(2.5));
        row.insert("x____median", StatValue::Float(2.0));
        row.insert("x____std", StatValue::Null);
        row.insert("x____min", StatValue::Int(1));
        row.insert("x____max", StatValue::Int(4));
        row.insert("ts____null_count", StatValue::Int(1));
        row.insert("ts____mean", StatValue::Float(86_400.75));
        row.insert("ts____median", StatValue::Null);
        row.insert("ts____min", StatValue::Int(0));
        row.insert("ts____max", StatValue::Int(172_800));
        row
    }

    #[test]
    fn test_reshape_groups_by_bucket() {
        let buckets = reshape(&classification(), FunctionSet::Summary, &full_row()).unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].var_type, VarType::NumInt);
        let x = &buckets[0].columns[0];
        assert_eq!(x.name, "x");
        assert_eq!(x.stats.len(), 6);
        assert_eq!(x.get(StatFunction::Mean), Some(&StatValue::Float(2.5)));
        assert_eq!(x.get(StatFunction::Std), Some(&StatValue::Null));
    }

    #[test]
    fn test_reshape_converts_datetimes() {
        let buckets = reshape(&classification(), FunctionSet::Summary, &full_row()).unwrap();
        let ts = &buckets[1].columns[0];

        assert_eq!(ts.get(StatFunction::NullCount), Some(&StatValue::Int(1)));
        assert_eq!(
            ts.get(StatFunction::Mean).unwrap().to_string(),
            "1970-01-02 00:00:00"
        );
        assert_eq!(ts.get(StatFunction::Median), Some(&StatValue::Null));
        assert_eq!(
            ts.get(StatFunction::Max).unwrap().to_string(),
            "1970-01-03 00:00:00"
        );
    }

    #[test]
    fn test_missing_alias_is_an_error() {
        let full = full_row();
        let mut row = StatRow::new();
        for alias in full.aliases().filter(|a| *a != "x____median") {
            row.insert(alias, full.get(alias).cloned().unwrap());
        }
        let err = reshape(&classification(), FunctionSet::Summary, &row).unwrap_err();
        assert!(matches!(err, StatsError::MissingStatistic(ref a) if a == "x____median"));
    }
}
