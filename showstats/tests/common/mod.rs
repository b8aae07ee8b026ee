//! Shared fixtures for integration tests.

#![allow(dead_code)]

use arrow::array::{
    ArrayRef, BinaryArray, BooleanArray, Date32Array, DictionaryArray, Float64Array, Int32Array,
    Int64Array, NullArray, StringArray, TimestampSecondArray,
};
use arrow::datatypes::Int32Type;
use arrow::record_batch::RecordBatch;
use showstats::Dataset;
use std::sync::Arc;

/// 2022-01-01 as days since the Unix epoch.
pub const DAY_2022_01_01: i32 = 18_993;

/// 2022-01-01T00:00:00Z as seconds since the Unix epoch.
pub const SECOND_2022_01_01: i64 = 1_640_995_200;

/// One column of every supported bucket, four rows each.
pub fn mixed_batch() -> RecordBatch {
    let dictionary: DictionaryArray<Int32Type> =
        vec![Some("low"), Some("high"), None, Some("low")].into_iter().collect();

    RecordBatch::try_from_iter(vec![
        (
            "flt",
            Arc::new(Float64Array::from(vec![Some(1.5), None, Some(2.5), Some(17.25)])) as ArrayRef,
        ),
        (
            "int",
            Arc::new(Int32Array::from(vec![3, -1, 1234, 8])) as ArrayRef,
        ),
        (
            "flag",
            Arc::new(BooleanArray::from(vec![Some(true), Some(false), None, Some(true)])) as ArrayRef,
        ),
        (
            "name",
            Arc::new(StringArray::from(vec!["bob", "alice", "carol", "alice"])) as ArrayRef,
        ),
        (
            "ts",
            Arc::new(TimestampSecondArray::from(vec![
                SECOND_2022_01_01,
                SECOND_2022_01_01 + 10,
                SECOND_2022_01_01 + 20,
                SECOND_2022_01_01 + 31,
            ])) as ArrayRef,
        ),
        (
            "day",
            Arc::new(Date32Array::from(vec![
                Some(DAY_2022_01_01 + 3),
                Some(DAY_2022_01_01),
                None,
                Some(DAY_2022_01_01 + 1),
            ])) as ArrayRef,
        ),
        ("level", Arc::new(dictionary) as ArrayRef),
        ("nothing", Arc::new(NullArray::new(4)) as ArrayRef),
    ])
    .unwrap()
}

pub fn mixed_dataset() -> Dataset {
    Dataset::from_batch(mixed_batch())
}

/// `A` 24 times, then `B` and `C` once each.
pub fn letters_dataset() -> Dataset {
    let mut letters = vec!["A"; 24];
    letters.extend(["B", "C"]);
    Dataset::try_from_columns(vec![(
        "letters",
        Arc::new(StringArray::from(letters)) as ArrayRef,
    )])
    .unwrap()
}

/// A single integer column `0..n`.
pub fn sequence_dataset(n: usize) -> Dataset {
    Dataset::try_from_columns(vec![(
        "seq",
        Arc::new(Int64Array::from_iter_values(0..n as i64)) as ArrayRef,
    )])
    .unwrap()
}

/// A dataset holding a binary column, which has no bucket.
pub fn binary_dataset() -> Dataset {
    Dataset::try_from_columns(vec![
        ("id", Arc::new(Int64Array::from(vec![1, 2])) as ArrayRef),
        (
            "payload",
            Arc::new(BinaryArray::from(vec![b"ab".as_ref(), b"cd".as_ref()])) as ArrayRef,
        ),
    ])
    .unwrap()
}
