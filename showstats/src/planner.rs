//! Aggregation planning.
//!
//! The planner turns a [`Classification`] into one SQL `SELECT` that computes
//! every scalar statistic of every column in a single pass, plus (for detail
//! reports) one `UNION ALL` query that counts value frequencies of all
//! categorical columns at once.
//!
//! Each (column, function) pair is named by an alias of the form
//! `{column}____{function}`, which [`parse_alias`] inverts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::classifier::{Classification, ColumnInfo, VarType};
use crate::error::{Result, StatsError};

/// Name under which the dataset is registered for querying.
pub const TABLE_NAME: &str = "showstats_input";

/// Separator between column name and function name in result aliases.
pub const ALIAS_SENTINEL: &str = "____";

const ROW_POSITION: &str = "__showstats_row";

/// A statistic the report can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatFunction {
    NullCount,
    Mean,
    Median,
    Std,
    Min,
    Max,
    #[serde(rename = "n_unique")]
    NUnique,
    TopValues,
}

impl StatFunction {
    pub const ALL: [StatFunction; 8] = [
        StatFunction::NullCount,
        StatFunction::Mean,
        StatFunction::Median,
        StatFunction::Std,
        StatFunction::Min,
        StatFunction::Max,
        StatFunction::NUnique,
        StatFunction::TopValues,
    ];

    /// The function's name as used in aliases.
    pub fn name(&self) -> &'static str {
        match self {
            StatFunction::NullCount => "null_count",
            StatFunction::Mean => "mean",
            StatFunction::Median => "median",
            StatFunction::Std => "std",
            StatFunction::Min => "min",
            StatFunction::Max => "max",
            StatFunction::NUnique => "n_unique",
            StatFunction::TopValues => "top_values",
        }
    }

    /// The column label shown in rendered tables.
    pub fn label(&self) -> &'static str {
        match self {
            StatFunction::NullCount => "Null %",
            StatFunction::Mean => "Mean",
            StatFunction::Median => "Median",
            StatFunction::Std => "Std.",
            StatFunction::Min => "Min",
            StatFunction::Max => "Max",
            StatFunction::NUnique => "N uniq.",
            StatFunction::TopValues => "Top values",
        }
    }
}

impl fmt::Display for StatFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatFunction {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        StatFunction::ALL
            .into_iter()
            .find(|function| function.name() == s)
            .ok_or_else(|| StatsError::configuration(format!("unknown statistic '{s}'")))
    }
}

/// Which statistics the categorical bucket receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FunctionSet {
    /// Overview table: categorical columns get min, max and distinct count.
    #[default]
    Summary,
    /// Categorical detail table: distinct count and most frequent values.
    Detail,
}

/// Returns the ordered statistics computed for a bucket.
pub fn functions_for(var_type: VarType, set: FunctionSet) -> &'static [StatFunction] {
    use StatFunction::*;
    match var_type {
        VarType::NumFloat | VarType::NumInt | VarType::NumBool => {
            &[NullCount, Mean, Median, Std, Min, Max]
        }
        VarType::Categorical => match set {
            FunctionSet::Summary => &[NullCount, Min, Max, NUnique],
            FunctionSet::Detail => &[NullCount, NUnique, TopValues],
        },
        VarType::Datetime => &[NullCount, Mean, Median, Min, Max],
        VarType::Date => &[NullCount, Min, Max],
        VarType::Null => &[NullCount],
    }
}

/// Builds the result alias for a (column, function) pair.
pub fn alias(column: &str, function: StatFunction) -> String {
    format!("{column}{ALIAS_SENTINEL}{}", function.name())
}

/// Splits an alias into its column name and function.
///
/// Splits on the last sentinel so column names may themselves contain it.
pub fn parse_alias(alias: &str) -> Option<(&str, StatFunction)> {
    let (column, function) = alias.rsplit_once(ALIAS_SENTINEL)?;
    let function = function.parse().ok()?;
    Some((column, function))
}

/// Quotes an identifier for use in generated SQL.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// One named aggregate expression of the statistics query.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSpec {
    pub column: String,
    pub var_type: VarType,
    pub function: StatFunction,
    pub alias: String,
    pub sql: String,
}

/// The queries needed to compute one report.
#[derive(Debug, Clone, Default)]
pub struct StatPlan {
    aggregates: Vec<AggregateSpec>,
    top_value_columns: Vec<String>,
}

impl StatPlan {
    /// Plans every statistic for every classified column.
    pub fn build(classification: &Classification, set: FunctionSet) -> Self {
        let mut aggregates = Vec::new();
        let mut top_value_columns = Vec::new();

        for (var_type, columns) in classification.buckets() {
            for column in columns {
                for &function in functions_for(*var_type, set) {
                    match sql_fragment(*var_type, function, column) {
                        Some(sql) => aggregates.push(AggregateSpec {
                            column: column.name.clone(),
                            var_type: *var_type,
                            function,
                            alias: alias(&column.name, function),
                            sql,
                        }),
                        None => top_value_columns.push(column.name.clone()),
                    }
                }
            }
        }

        Self {
            aggregates,
            top_value_columns,
        }
    }

    pub fn aggregates(&self) -> &[AggregateSpec] {
        &self.aggregates
    }

    /// Columns whose most frequent values are requested, in plan order.
    pub fn top_value_columns(&self) -> &[String] {
        &self.top_value_columns
    }

    pub fn is_empty(&self) -> bool {
        self.aggregates.is_empty() && self.top_value_columns.is_empty()
    }

    /// The single-row query computing every scalar statistic.
    pub fn aggregate_sql(&self) -> Option<String> {
        if self.aggregates.is_empty() {
            return None;
        }
        let select_parts: Vec<String> = self
            .aggregates
            .iter()
            .map(|spec| format!("{} AS {}", spec.sql, quote_identifier(&spec.alias)))
            .collect();
        Some(format!(
            "SELECT {} FROM {}",
            select_parts.join(", "),
            quote_identifier(TABLE_NAME)
        ))
    }

    /// The frequency query over all top-value columns.
    ///
    /// Produces rows of `(column_index, value, frequency, first_row)` where
    /// `column_index` points into [`StatPlan::top_value_columns`] and
    /// `first_row` is the 1-based position of the value's first occurrence.
    pub fn top_values_sql(&self) -> Option<String> {
        if self.top_value_columns.is_empty() {
            return None;
        }
        let row = quote_identifier(ROW_POSITION);
        let branches: Vec<String> = self
            .top_value_columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let col = quote_identifier(column);
                format!(
                    "SELECT CAST({idx} AS BIGINT) AS \"column_index\", \"value\", COUNT(*) AS \"frequency\", MIN(\"row_pos\") AS \"first_row\" \
                     FROM (SELECT CAST({col} AS VARCHAR) AS \"value\", {row} AS \"row_pos\" FROM \"__ranked\" WHERE {col} IS NOT NULL) AS t{idx} \
                     GROUP BY \"value\""
                )
            })
            .collect();
        Some(format!(
            "WITH \"__ranked\" AS (SELECT *, ROW_NUMBER() OVER () AS {row} FROM {}) {}",
            quote_identifier(TABLE_NAME),
            branches.join(" UNION ALL ")
        ))
    }
}

/// Resolves a (bucket, function) pair to its SQL aggregate expression.
///
/// Returns `None` for statistics that are not scalar aggregates.
fn sql_fragment(var_type: VarType, function: StatFunction, column: &ColumnInfo) -> Option<String> {
    let col = quote_identifier(&column.name);
    let as_double = format!("CAST({col} AS DOUBLE)");
    let epoch = format!("CAST({col} AS BIGINT)");

    let sql = match (function, var_type) {
        (StatFunction::TopValues, _) => return None,
        (StatFunction::NullCount, _) => format!("SUM(CASE WHEN {col} IS NULL THEN 1 ELSE 0 END)"),
        (StatFunction::NUnique, _) => format!("COUNT(DISTINCT CAST({col} AS VARCHAR))"),

        (StatFunction::Mean, VarType::Datetime) => format!("AVG(CAST({epoch} AS DOUBLE))"),
        (StatFunction::Median, VarType::Datetime) => format!("MEDIAN(CAST({epoch} AS DOUBLE))"),
        (StatFunction::Min, VarType::Datetime) => format!("MIN({epoch})"),
        (StatFunction::Max, VarType::Datetime) => format!("MAX({epoch})"),

        (StatFunction::Mean, _) => format!("AVG({as_double})"),
        (StatFunction::Median, _) => format!("MEDIAN({as_double})"),
        (StatFunction::Std, _) => format!("STDDEV({as_double})"),

        (StatFunction::Min, VarType::NumFloat) => format!("MIN({as_double})"),
        (StatFunction::Max, VarType::NumFloat) => format!("MAX({as_double})"),
        (StatFunction::Min, VarType::NumBool) => format!("BOOL_AND({col})"),
        (StatFunction::Max, VarType::NumBool) => format!("BOOL_OR({col})"),
        (StatFunction::Min, VarType::Categorical) => format!("MIN(CAST({col} AS VARCHAR))"),
        (StatFunction::Max, VarType::Categorical) => format!("MAX(CAST({col} AS VARCHAR))"),
        (StatFunction::Min, _) => format!("MIN({col})"),
        (StatFunction::Max, _) => format!("MAX({col})"),
    };
    Some(sql)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{DataType, Field, Schema, TimeUnit};

    fn classify(fields: Vec<Field>) -> Classification {
        Classification::classify(&Schema::new(fields), &VarType::ALL).unwrap()
    }

    #[test]
    fn test_alias_round_trip() {
        let a = alias("price", StatFunction::Median);
        assert_eq!(a, "price____median");
        assert_eq!(parse_alias(&a), Some(("price", StatFunction::Median)));
    }

    #[test]
    fn test_parse_alias_splits_on_last_sentinel() {
        let a = alias("odd____name", StatFunction::NullCount);
        assert_eq!(parse_alias(&a), Some(("odd____name", StatFunction::NullCount)));
        assert_eq!(parse_alias("no_sentinel"), None);
        assert_eq!(parse_alias("col____bogus"), None);
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("plain"), "\"plain\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_function_lists() {
        assert_eq!(
            functions_for(VarType::NumInt, FunctionSet::Summary),
            &[
                StatFunction::NullCount,
                StatFunction::Mean,
                StatFunction::Median,
                StatFunction::Std,
                StatFunction::Min,
                StatFunction::Max
            ]
        );
        assert_eq!(
            functions_for(VarType::Categorical, FunctionSet::Detail),
            &[
                StatFunction::NullCount,
                StatFunction::NUnique,
                StatFunction::TopValues
            ]
        );
        assert_eq!(
            functions_for(VarType::Null, FunctionSet::Detail),
            &[StatFunction::NullCount]
        );
    }

    #[test]
    fn test_summary_plan_has_one_aggregate_per_pair() {
        let classification = classify(vec![
            Field::new("x", DataType::Float64, true),
            Field::new("s", DataType::Utf8, true),
        ]);
        let plan = StatPlan::build(&classification, FunctionSet::Summary);

        assert_eq!(plan.aggregates().len(), 6 + 4);
        assert!(plan.top_value_columns().is_empty());
        assert!(plan.top_values_sql().is_none());

        let sql = plan.aggregate_sql().unwrap();
        assert!(sql.starts_with("SELECT SUM(CASE WHEN \"x\" IS NULL THEN 1 ELSE 0 END) AS \"x____null_count\""));
        assert!(sql.contains("MEDIAN(CAST(\"x\" AS DOUBLE)) AS \"x____median\""));
        assert!(sql.contains("COUNT(DISTINCT CAST(\"s\" AS VARCHAR)) AS \"s____n_unique\""));
        assert!(sql.ends_with("FROM \"showstats_input\""));
    }

    #[test]
    fn test_detail_plan_batches_top_values() {
        let classification = classify(vec![
            Field::new("a", DataType::Utf8, true),
            Field::new("b", DataType::LargeUtf8, true),
        ]);
        let plan = StatPlan::build(&classification, FunctionSet::Detail);

        assert_eq!(plan.top_value_columns(), &["a".to_string(), "b".to_string()]);
        let sql = plan.top_values_sql().unwrap();
        assert_eq!(sql.matches("UNION ALL").count(), 1);
        assert!(sql.contains("ROW_NUMBER() OVER ()"));
        assert!(sql.contains("WHERE \"b\" IS NOT NULL"));
    }

    #[test]
    fn test_type_specific_fragments() {
        let classification = classify(vec![
            Field::new("flag", DataType::Boolean, true),
            Field::new("ts", DataType::Timestamp(TimeUnit::Millisecond, None), true),
            Field::new("n", DataType::Int16, true),
        ]);
        let plan = StatPlan::build(&classification, FunctionSet::Summary);
        let sql = plan.aggregate_sql().unwrap();

        assert!(sql.contains("BOOL_AND(\"flag\") AS \"flag____min\""));
        assert!(sql.contains("BOOL_OR(\"flag\") AS \"flag____max\""));
        assert!(sql.contains("MIN(CAST(\"ts\" AS BIGINT)) AS \"ts____min\""));
        assert!(sql.contains("AVG(CAST(CAST(\"ts\" AS BIGINT) AS DOUBLE)) AS \"ts____mean\""));
        assert!(sql.contains("MIN(\"n\") AS \"n____min\""));
        assert!(!sql.contains("ts____std"));
    }

    #[test]
    fn test_stat_function_names_parse() {
        for function in StatFunction::ALL {
            assert_eq!(function.name().parse::<StatFunction>().unwrap(), function);
        }
    }
}
