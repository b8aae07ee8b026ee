//! Text formatting of statistics.
//!
//! Numbers are rounded to two significant figures, null shares are bucketed
//! into coarse bands, and the row count is embedded in the first header.

use arrow::datatypes::TimeUnit;
use arrow::temporal_conversions::{
    timestamp_ms_to_datetime, timestamp_ns_to_datetime, timestamp_s_to_datetime,
    timestamp_us_to_datetime,
};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use tracing::warn;

use crate::classifier::VarType;
use crate::planner::StatFunction;
use crate::value::{StatValue, ValueCount};

/// Row counts at or above this are shown in scientific notation.
pub const SCIENTIFIC_THRESHOLD: usize = 100_000;

/// Significant figures kept for floating-point statistics.
pub const SIGNIFICANT_FIGURES: i32 = 2;

const NULL_BANDS: [u32; 14] = [1, 2, 3, 5, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

/// Percentage of nulls, rounded to two decimals.
pub fn null_percentage(null_count: u64, rows: usize) -> f64 {
    if rows == 0 {
        return 0.0;
    }
    let pct = null_count as f64 / rows as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Maps a null percentage to its display band.
///
/// Exactly zero is `0%`, exactly 100 is `100%`; anything else gets the first
/// band bound it is strictly below.
pub fn null_band(pct: f64) -> String {
    if pct <= 0.0 {
        return "0%".to_string();
    }
    NULL_BANDS
        .iter()
        .find(|&&bound| pct < f64::from(bound))
        .map(|bound| format!("<{bound}%"))
        .unwrap_or_else(|| "100%".to_string())
}

/// The `Null %` cell for a column.
pub fn null_share_label(null_count: u64, rows: usize) -> String {
    null_band(null_percentage(null_count, rows))
}

/// Rounds to `sig` significant figures.
pub fn round_sig_figs(value: f64, sig: i32) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let digits = sig - value.abs().log10().ceil() as i32;
    if digits >= 0 {
        let factor = 10f64.powi(digits);
        (value * factor).round() / factor
    } else {
        let factor = 10f64.powi(-digits);
        (value / factor).round() * factor
    }
}

/// Renders a float rounded to two significant figures, always with a decimal point.
pub fn format_float(value: f64) -> String {
    format!("{:?}", round_sig_figs(value, SIGNIFICANT_FIGURES))
}

/// Renders one statistic cell.
///
/// Integer and boolean extremes are printed exactly; every other number is
/// rounded. SQL NULL renders as the empty string.
pub fn format_stat(var_type: VarType, function: StatFunction, value: &StatValue) -> String {
    match value {
        StatValue::Null => String::new(),
        StatValue::Float(v) => format_float(*v),
        StatValue::Int(v) => match (var_type, function) {
            (VarType::NumFloat, _) | (_, StatFunction::Mean | StatFunction::Median | StatFunction::Std) => {
                format_float(*v as f64)
            }
            _ => v.to_string(),
        },
        other => other.to_string(),
    }
}

/// Renders a top-value entry as `value (pct%)` relative to all rows.
pub fn format_top_value(entry: &ValueCount, rows: usize) -> String {
    let pct = if rows == 0 {
        0.0
    } else {
        entry.count as f64 / rows as f64 * 100.0
    };
    format!("{} ({pct:.0}%)", entry.value)
}

/// Placeholder for a missing rank in the spread top-values layout.
pub const EMPTY_TOP_VALUE: &str = "(0%)";

/// Inserts thousands separators.
pub fn with_thousands_separators(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Renders an integer exponent with Unicode superscript digits.
pub fn superscript(exponent: i32) -> String {
    let mut out = String::new();
    if exponent < 0 {
        out.push('⁻');
    }
    for ch in exponent.unsigned_abs().to_string().chars() {
        out.push(match ch {
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            _ => '⁹',
        });
    }
    out
}

/// Renders a number as `m.mm×10ᵉ`.
pub fn scientific(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value:.2}");
    }
    let mut exponent = value.abs().log10().floor() as i32;
    let mut mantissa = (value / 10f64.powi(exponent) * 100.0).round() / 100.0;
    if mantissa.abs() >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    }
    format!("{mantissa:.2}×10{}", superscript(exponent))
}

/// Renders a row count, switching to scientific notation for large counts.
pub fn format_row_count(rows: usize) -> String {
    if rows < SCIENTIFIC_THRESHOLD {
        format!("= {}", with_thousands_separators(rows))
    } else {
        format!("≈ {}", scientific(rows as f64))
    }
}

/// The row-label header, e.g. `Var; N = 2` or `Var; N ≈ 1.23×10⁵`.
pub fn variable_header(rows: usize) -> String {
    format!("Var; N {}", format_row_count(rows))
}

/// Converts an epoch offset in `unit` to a UTC wall-clock timestamp.
pub fn epoch_to_datetime(epoch: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    match unit {
        TimeUnit::Second => timestamp_s_to_datetime(epoch),
        TimeUnit::Millisecond => timestamp_ms_to_datetime(epoch),
        TimeUnit::Microsecond => timestamp_us_to_datetime(epoch),
        TimeUnit::Nanosecond => timestamp_ns_to_datetime(epoch),
    }
}

/// Computes the display order of rows given names to pin to the top.
///
/// Pinned names come first in the order given; every other row keeps its
/// position relative to the others. Unknown names are skipped with a warning,
/// repeated names count once.
pub fn pin_order(names: &[&str], pinned: &[String]) -> Vec<usize> {
    let mut rank: HashMap<&str, usize> = HashMap::new();
    for name in pinned {
        if !names.contains(&name.as_str()) {
            warn!(column = %name, "Pinned column not found, ignoring");
            continue;
        }
        let next = rank.len();
        rank.entry(name.as_str()).or_insert(next);
    }

    let mut order: Vec<usize> = (0..names.len()).collect();
    order.sort_by_key(|&idx| rank.get(names[idx]).copied().unwrap_or(usize::MAX));
    order
}
