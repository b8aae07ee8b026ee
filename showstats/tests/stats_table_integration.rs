//! Integration tests for summary and categorical statistics tables.

mod common;

use common::*;
use arrow::record_batch::RecordBatch;
use datafusion::prelude::SessionContext;
use serde_json::json;
use showstats::presenter::{DisplayConfig, MarkdownFormatter, TableFormatter};
use showstats::{
    make_cat_stats_table, make_stats_table, StatsError, StatsReport, TableType, TopValuesLayout,
    VarType,
};

#[tokio::test]
async fn test_all_null_column() {
    let data = json!({"null_col": [null, null, null]});
    let table = make_stats_table(&data, &[]).await.unwrap();

    assert_eq!((table.height(), table.width()), (1, 7));
    assert_eq!(table.cell("null_col", "Null %"), Some("100%"));
    for label in ["Mean", "Median", "Std.", "Min", "Max"] {
        assert_eq!(table.cell("null_col", label), Some(""), "{label}");
    }
}

#[tokio::test]
async fn test_float_column_mean() {
    let data = json!({"flt_col": [1.3, 1.9]});
    let table = make_stats_table(&data, &[]).await.unwrap();

    assert_eq!(table.cell("flt_col", "Mean"), Some("1.6"));
    assert_eq!(table.cell("flt_col", "Null %"), Some("0%"));
    assert!(table.header().unwrap().contains('2'));
    assert_eq!(table.header(), Some("Var; N = 2"));
}

#[tokio::test]
async fn test_categorical_top_values() {
    let table = make_cat_stats_table(letters_dataset(), &[]).await.unwrap();

    assert_eq!(
        table.labels(),
        &["Var; N = 26", "Null %", "N uniq.", "Top values"]
    );
    assert_eq!(table.cell("letters", "N uniq."), Some("3"));
    assert_eq!(table.cell("letters", "Null %"), Some("0%"));
    assert_eq!(
        table.cell("letters", "Top values"),
        Some("A (92%)\nB (4%)\nC (4%)")
    );
}

#[tokio::test]
async fn test_single_value_top_values() {
    let data = json!({"s": ["A", "A"]});
    let table = make_cat_stats_table(&data, &[]).await.unwrap();
    assert_eq!(table.cell("s", "Top values"), Some("A (100%)"));
}

#[tokio::test]
async fn test_large_row_count_header() {
    let table = make_stats_table(sequence_dataset(100_000), &[]).await.unwrap();
    assert_eq!(table.header(), Some("Var; N ≈ 1.00×10⁵"));

    let table = make_stats_table(sequence_dataset(99_999), &[]).await.unwrap();
    assert_eq!(table.header(), Some("Var; N = 99,999"));
}

#[tokio::test]
async fn test_mixed_summary_table() {
    let table = make_stats_table(mixed_dataset(), &[]).await.unwrap();
    println!("{table:#?}");

    assert_eq!(
        table.variables(),
        vec!["flt", "int", "flag", "ts", "day", "name", "level", "nothing"]
    );
    assert_eq!(table.width(), 8);

    assert_eq!(table.cell("flt", "Null %"), Some("<30%"));
    assert_eq!(table.cell("flt", "Mean"), Some("7.1"));
    assert_eq!(table.cell("flt", "Median"), Some("2.5"));
    assert_eq!(table.cell("flt", "Std."), Some("8.8"));
    assert_eq!(table.cell("flt", "Min"), Some("1.5"));
    assert_eq!(table.cell("flt", "Max"), Some("17.0"));

    assert_eq!(table.cell("int", "Mean"), Some("310.0"));
    assert_eq!(table.cell("int", "Median"), Some("5.5"));
    assert_eq!(table.cell("int", "Min"), Some("-1"));
    assert_eq!(table.cell("int", "Max"), Some("1234"));

    assert_eq!(table.cell("flag", "Mean"), Some("0.67"));
    assert_eq!(table.cell("flag", "Min"), Some("false"));
    assert_eq!(table.cell("flag", "Max"), Some("true"));

    assert_eq!(table.cell("ts", "Min"), Some("2022-01-01 00:00:00"));
    assert_eq!(table.cell("ts", "Max"), Some("2022-01-01 00:00:31"));
    assert_eq!(table.cell("ts", "Mean"), Some("2022-01-01 00:00:15"));
    assert_eq!(table.cell("ts", "Std."), Some(""));

    assert_eq!(table.cell("day", "Min"), Some("2022-01-01"));
    assert_eq!(table.cell("day", "Max"), Some("2022-01-04"));
    assert_eq!(table.cell("day", "Mean"), Some(""));

    assert_eq!(table.cell("name", "Min"), Some("alice"));
    assert_eq!(table.cell("name", "Max"), Some("carol"));
    assert_eq!(table.cell("name", "N uniq."), Some("3"));
    assert_eq!(table.cell("level", "Min"), Some("high"));
    assert_eq!(table.cell("level", "N uniq."), Some("2"));

    assert_eq!(table.cell("nothing", "Null %"), Some("100%"));
    assert_eq!(table.cell("nothing", "N uniq."), Some(""));
}

#[tokio::test]
async fn test_mixed_categorical_table() {
    let table = make_cat_stats_table(mixed_dataset(), &[]).await.unwrap();

    assert_eq!(table.variables(), vec!["name", "level"]);
    assert_eq!(
        table.cell("name", "Top values"),
        Some("alice (50%)\nbob (25%)\ncarol (25%)")
    );
    assert_eq!(table.cell("level", "Null %"), Some("<30%"));
    assert_eq!(table.cell("level", "Top values"), Some("low (50%)\nhigh (25%)"));
}

#[tokio::test]
async fn test_every_column_appears_exactly_once() {
    let dataset = mixed_dataset();
    let table = make_stats_table(&dataset, &[]).await.unwrap();

    let mut shown: Vec<&str> = table.variables();
    shown.sort_unstable();
    let mut expected = dataset.column_names();
    expected.sort_unstable();
    assert_eq!(shown, expected);
}

#[tokio::test]
async fn test_pinned_columns_come_first() {
    let table = make_stats_table(mixed_dataset(), &["name", "ghost", "int"])
        .await
        .unwrap();

    assert_eq!(
        table.variables(),
        vec!["name", "int", "flt", "flag", "ts", "day", "level", "nothing"]
    );
}

#[tokio::test]
async fn test_output_is_idempotent() {
    let dataset = mixed_dataset();
    let report = StatsReport::summary().with_top_cols(["day"]);

    let first = report.render(&dataset).await.unwrap();
    let second = report.render(&dataset).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_table_type_selection() {
    let numeric = StatsReport::summary()
        .with_table_type("num".parse().unwrap())
        .make_table(mixed_dataset())
        .await
        .unwrap();
    assert_eq!(numeric.variables(), vec!["flt", "int", "flag"]);
    assert_eq!(numeric.width(), 7);

    let categorical = StatsReport::summary()
        .with_table_type(TableType::Categorical)
        .make_table(mixed_dataset())
        .await
        .unwrap();
    assert_eq!(categorical.variables(), vec!["name", "level"]);

    let dates = StatsReport::summary()
        .with_var_types([VarType::Date, VarType::Datetime])
        .make_table(mixed_dataset())
        .await
        .unwrap();
    assert_eq!(dates.variables(), vec!["ts", "day"]);
}

#[tokio::test]
async fn test_no_matching_columns() {
    let data = json!({"x": [1, 2, 3]});

    let text = StatsReport::categorical().render(&data).await.unwrap();
    assert_eq!(text, "No categorical columns found\n");

    let table = make_cat_stats_table(&data, &[]).await.unwrap();
    assert!(table.is_empty());

    let data = json!({"s": ["a", "b"]});
    let text = StatsReport::summary()
        .with_table_type(TableType::Numeric)
        .render(&data)
        .await
        .unwrap();
    assert_eq!(text, "No numerical columns found\n");
}

#[tokio::test]
async fn test_rendered_markdown() {
    let data = json!({"flt_col": [1.3, 1.9]});
    let text = StatsReport::summary().render(&data).await.unwrap();

    let expected = "\
| Var; N = 2 | Null % | Mean | Median | Std. | Min | Max |
|------------|--------|------|--------|------|-----|-----|
| flt_col    | 0%     | 1.6  | 1.6    | 0.42 | 1.3 | 1.9 |
";
    assert_eq!(text, expected);
}

#[tokio::test]
async fn test_display_config_is_applied() {
    let data = json!({"flt_col": [1.3, 1.9]});
    let text = StatsReport::summary()
        .with_display(DisplayConfig::default().with_shape(true))
        .render(&data)
        .await
        .unwrap();
    assert!(text.starts_with("shape: (1, 7)\n"));
}

#[tokio::test]
async fn test_spread_layout() {
    let table = StatsReport::categorical()
        .with_layout(TopValuesLayout::Spread { k: 4 })
        .make_table(letters_dataset())
        .await
        .unwrap();

    assert_eq!(table.cell("letters", "Top 1"), Some("A (92%)"));
    assert_eq!(table.cell("letters", "Top 3"), Some("C (4%)"));
    assert_eq!(table.cell("letters", "Top 4"), Some("(0%)"));

    let rendered = MarkdownFormatter::default().format(&table).unwrap();
    assert!(rendered.contains("| Top 4 |"));
}

#[tokio::test]
async fn test_inputs_of_every_kind() {
    let batch = mixed_batch();

    let from_batch = make_stats_table(batch.clone(), &[]).await.unwrap();

    let from_batches = make_stats_table(vec![batch.clone(), batch.clone()], &[])
        .await
        .unwrap();
    assert_eq!(from_batches.header(), Some("Var; N = 8"));
    assert_eq!(
        from_batches.cell("flt", "Mean"),
        from_batch.cell("flt", "Mean")
    );

    let ctx = SessionContext::new();
    let df = ctx.read_batch(batch).unwrap();
    let from_df = make_stats_table(df, &[]).await.unwrap();
    assert_eq!(from_df, from_batch);
}

#[tokio::test]
async fn test_errors() {
    let err = make_stats_table(sequence_dataset(0), &[]).await.unwrap_err();
    assert!(matches!(err, StatsError::EmptyDataset { rows: 0, columns: 1 }));

    let err = make_stats_table(binary_dataset(), &[]).await.unwrap_err();
    assert!(
        matches!(err, StatsError::UnsupportedType { ref column, .. } if column == "payload")
    );

    let err = "everything".parse::<TableType>().unwrap_err();
    assert!(matches!(err, StatsError::Configuration(_)));

    let err = make_stats_table(json!([1, 2, 3]), &[]).await.unwrap_err();
    assert!(matches!(err, StatsError::Conversion { .. }));

    let err = make_stats_table(Vec::<RecordBatch>::new(), &[]).await.unwrap_err();
    assert!(matches!(err, StatsError::EmptyDataset { .. }));
}

#[tokio::test]
async fn test_table_json_export() {
    let table = make_stats_table(json!({"flt_col": [1.3, 1.9]}), &[])
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&table.to_json().unwrap()).unwrap();

    assert_eq!(value["columns"][0], "Var; N = 2");
    assert_eq!(value["rows"][0][2], "1.6");
}
