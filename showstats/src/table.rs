//! The rendered statistics table.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A table of display strings, one row per column of the input dataset.
///
/// The first label is the row-label header and embeds the dataset's row count
/// (e.g. `Var; N = 26`); the first cell of every row is the variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl StatsTable {
    /// Creates a table with the given labels and no rows.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// A table with neither labels nor rows.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub(crate) fn reorder_rows(&mut self, order: &[usize]) {
        let mut reordered = Vec::with_capacity(self.rows.len());
        for &idx in order {
            if let Some(row) = self.rows.get(idx) {
                reordered.push(row.clone());
            }
        }
        self.rows = reordered;
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row-label header, if the table has labels.
    pub fn header(&self) -> Option<&str> {
        self.columns.first().map(String::as_str)
    }

    /// All column labels, header first.
    pub fn labels(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Variable names in display order.
    pub fn variables(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.first().map(String::as_str))
            .collect()
    }

    /// Looks up the cell for a variable under a label.
    pub fn cell(&self, variable: &str, label: &str) -> Option<&str> {
        let col = self.label_index(label)?;
        self.rows
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(variable))
            .and_then(|row| row.get(col))
            .map(String::as_str)
    }

    /// All cells under a label, in row order.
    pub fn column(&self, label: &str) -> Option<Vec<&str>> {
        let col = self.label_index(label)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| row.get(col).map(String::as_str))
                .collect(),
        )
    }

    /// Serializes the table as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn label_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }
}
