//! Sample datasets for tests, benches and demos.
//!
//! Available with the `test-utils` feature. Random content is drawn from a
//! fixed seed, so every call with the same `n` returns the same data.

use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, DictionaryArray, Float64Array, Int64Array, NullArray,
    StringArray, TimestampMicrosecondArray,
};
use arrow::datatypes::Int32Type;
use chrono::{NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

use crate::dataset::Dataset;
use crate::error::{Result, StatsError};

const SEED: u64 = 1;

fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - NaiveDate::default()).num_days() as i32
}

fn date(y: i32, m: u32, d: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| StatsError::internal(format!("invalid date {y}-{m}-{d}")))
}

fn midnight_micros(date: NaiveDate) -> Result<i64> {
    let dt: NaiveDateTime = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| StatsError::internal("invalid time"))?;
    Ok(dt.and_utc().timestamp_micros())
}

/// A dataset with one or more columns of every bucket.
///
/// Columns: `int_col`, `int_with_missing` (rows 10..30 null), `float_col`,
/// `bool_col`, `str_col`, `date_col`, `date_col_2`, `datetime_col`,
/// `datetime_col_2`, `categorical_col` (dictionary encoded) and `null_col`.
pub fn sample_dataset(n: usize) -> Result<Dataset> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let words = ["foo", "bar", "baz", "ABC"];
    let levels = ["low", "medium", "high"];

    let ints: Vec<i64> = (0..n as i64).collect();
    let with_missing: Vec<Option<i64>> = (0..n as i64)
        .map(|i| (!(10..30).contains(&i)).then_some(i))
        .collect();
    let floats: Vec<f64> = (0..n).map(|i| i as f64 / 100.0).collect();
    let bools: Vec<bool> = (0..n).map(|i| i % 2 == 0).collect();
    let strings: Vec<&str> = (0..n)
        .map(|_| words[rng.random_range(0..words.len())])
        .collect();
    let categories: Vec<&str> = (0..n)
        .map(|_| levels[rng.random_range(0..levels.len())])
        .collect();

    let start_2022 = days_since_epoch(date(2022, 1, 1)?);
    let start_1500 = days_since_epoch(date(1500, 1, 1)?);
    let dates: Vec<i32> = (0..n as i32).map(|i| start_2022 + i).collect();
    let dates_2: Vec<i32> = (0..n as i32).map(|i| start_1500 + i).collect();

    let second = 1_000_000i64;
    let ts_2022 = midnight_micros(date(2022, 1, 1)?)?;
    let ts_1995 = midnight_micros(date(1995, 1, 1)?)?;
    let datetimes: Vec<i64> = (0..n as i64).map(|i| ts_2022 + i * second).collect();
    let datetimes_2: Vec<i64> = (0..n as i64).map(|i| ts_1995 + i * second).collect();

    let dictionary: DictionaryArray<Int32Type> = categories.into_iter().collect();

    Dataset::try_from_columns(vec![
        ("int_col", Arc::new(Int64Array::from(ints)) as ArrayRef),
        ("int_with_missing", Arc::new(Int64Array::from(with_missing)) as ArrayRef),
        ("float_col", Arc::new(Float64Array::from(floats)) as ArrayRef),
        ("bool_col", Arc::new(BooleanArray::from(bools)) as ArrayRef),
        ("str_col", Arc::new(StringArray::from(strings)) as ArrayRef),
        ("date_col", Arc::new(Date32Array::from(dates)) as ArrayRef),
        ("date_col_2", Arc::new(Date32Array::from(dates_2)) as ArrayRef),
        (
            "datetime_col",
            Arc::new(TimestampMicrosecondArray::from(datetimes)) as ArrayRef,
        ),
        (
            "datetime_col_2",
            Arc::new(TimestampMicrosecondArray::from(datetimes_2)) as ArrayRef,
        ),
        ("categorical_col", Arc::new(dictionary) as ArrayRef),
        ("null_col", Arc::new(NullArray::new(n)) as ArrayRef),
    ])
}

/// Twenty-six letters: `A` 24 times, then one `B` and one `C`.
pub fn letters_dataset() -> Result<Dataset> {
    let mut letters = vec!["A"; 24];
    letters.extend(["B", "C"]);
    Dataset::try_from_columns(vec![(
        "letters",
        Arc::new(StringArray::from(letters)) as ArrayRef,
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classification, VarType};

    #[test]
    fn test_sample_dataset_covers_every_bucket() {
        let dataset = sample_dataset(100).unwrap();
        assert_eq!(dataset.num_rows(), 100);
        assert_eq!(dataset.num_columns(), 11);

        let classification = Classification::classify(&dataset.schema(), &VarType::ALL).unwrap();
        for var_type in VarType::ALL {
            assert!(classification.contains(var_type), "missing {var_type}");
        }
        assert_eq!(classification.column_count(), 11);
    }

    #[test]
    fn test_sample_dataset_is_deterministic() {
        let a = sample_dataset(150).unwrap();
        let b = sample_dataset(150).unwrap();
        assert_eq!(a.batches()[0], b.batches()[0]);
    }

    #[test]
    fn test_days_since_epoch() {
        assert_eq!(days_since_epoch(date(1970, 1, 2).unwrap()), 1);
        assert_eq!(days_since_epoch(date(2022, 1, 1).unwrap()), 18_993);
    }
}
