//! Rendering of [`StatsTable`]s.
//!
//! This module provides formatters that turn a finished table into text: an
//! ASCII markdown grid for terminals and JSON for programmatic consumption.
//! Display options are passed explicitly through [`DisplayConfig`]; nothing
//! here reads or changes global state.
//!
//! # Examples
//!
//! ```rust
//! use showstats::presenter::{DisplayConfig, MarkdownFormatter, TableFormatter};
//! use showstats::table::StatsTable;
//!
//! let formatter = MarkdownFormatter::new(DisplayConfig::default().with_shape(true));
//! let output = formatter.format(&StatsTable::empty()).unwrap();
//! assert!(output.is_empty());
//! ```

use std::fmt::Write;

use crate::error::{Result, StatsError};
use crate::table::StatsTable;

/// Horizontal alignment of cell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Options controlling how a table is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Print a `shape: (rows, columns)` banner above the table
    pub show_shape: bool,
    /// Print a row of column types under the header
    pub show_dtypes: bool,
    /// Alignment of every cell
    pub alignment: CellAlignment,
    /// Truncate cell lines longer than this many characters
    pub max_cell_width: Option<usize>,
    /// Show at most this many rows (`None` shows all)
    pub max_rows: Option<usize>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_shape: false,
            show_dtypes: false,
            alignment: CellAlignment::Left,
            max_cell_width: None,
            max_rows: None,
        }
    }
}

impl DisplayConfig {
    /// Creates a compact configuration for narrow terminals.
    pub fn compact() -> Self {
        Self {
            max_cell_width: Some(24),
            ..Self::default()
        }
    }

    /// Sets whether to print the shape banner.
    pub fn with_shape(mut self, show: bool) -> Self {
        self.show_shape = show;
        self
    }

    /// Sets whether to print the column type row.
    pub fn with_dtypes(mut self, show: bool) -> Self {
        self.show_dtypes = show;
        self
    }

    /// Sets the cell alignment.
    pub fn with_alignment(mut self, alignment: CellAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the maximum cell width.
    pub fn with_max_cell_width(mut self, width: usize) -> Self {
        self.max_cell_width = Some(width);
        self
    }

    /// Sets the maximum number of rows shown.
    pub fn with_max_rows(mut self, rows: usize) -> Self {
        self.max_rows = Some(rows);
        self
    }
}

/// Trait for turning a [`StatsTable`] into text.
pub trait TableFormatter {
    /// Formats a table into a string representation.
    fn format(&self, table: &StatsTable) -> Result<String>;

    /// Formats a table with custom configuration.
    fn format_with_config(&self, table: &StatsTable, _config: &DisplayConfig) -> Result<String> {
        self.format(table)
    }
}

/// Renders tables as ASCII markdown grids.
#[derive(Debug, Clone, Default)]
pub struct MarkdownFormatter {
    config: DisplayConfig,
}

impl MarkdownFormatter {
    pub fn new(config: DisplayConfig) -> Self {
        Self { config }
    }

    fn render(&self, table: &StatsTable, config: &DisplayConfig) -> Result<String> {
        if table.width() == 0 {
            return Ok(String::new());
        }

        let shown = config.max_rows.unwrap_or(usize::MAX).min(table.height());
        let clip = |line: &str| -> String {
            match config.max_cell_width {
                Some(max) if line.chars().count() > max => {
                    let mut clipped: String = line.chars().take(max.saturating_sub(1)).collect();
                    clipped.push('…');
                    clipped
                }
                _ => line.to_string(),
            }
        };

        // Each cell split into its physical lines
        let header: Vec<Vec<String>> = table.labels().iter().map(|l| vec![clip(l)]).collect();
        let dtypes: Vec<Vec<String>> = vec![vec!["str".to_string()]; table.width()];
        let mut body: Vec<Vec<Vec<String>>> = table.rows()[..shown]
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.split('\n').map(|line| clip(line)).collect())
                    .collect()
            })
            .collect();
        if shown < table.height() {
            body.push(vec![vec!["…".to_string()]; table.width()]);
        }

        let mut widths: Vec<usize> = vec![0; table.width()];
        let all_rows = std::iter::once(&header)
            .chain(config.show_dtypes.then_some(&dtypes))
            .chain(body.iter());
        for row in all_rows {
            for (col, lines) in row.iter().enumerate() {
                for line in lines {
                    widths[col] = widths[col].max(line.chars().count());
                }
            }
        }

        let mut output = String::new();
        if config.show_shape {
            writeln!(output, "shape: ({}, {})", table.height(), table.width())
                .map_err(|e| StatsError::internal(e.to_string()))?;
        }
        self.write_row(&mut output, &header, &widths, config.alignment)?;
        let separator: Vec<String> = widths
            .iter()
            .map(|&w| match config.alignment {
                CellAlignment::Left => "-".repeat(w + 2),
                CellAlignment::Right => format!("{}:", "-".repeat(w + 1)),
                CellAlignment::Center => format!(":{}:", "-".repeat(w)),
            })
            .collect();
        writeln!(output, "|{}|", separator.join("|"))
            .map_err(|e| StatsError::internal(e.to_string()))?;
        if config.show_dtypes {
            self.write_row(&mut output, &dtypes, &widths, config.alignment)?;
        }
        for row in &body {
            self.write_row(&mut output, row, &widths, config.alignment)?;
        }
        Ok(output)
    }

    fn write_row(
        &self,
        output: &mut String,
        row: &[Vec<String>],
        widths: &[usize],
        alignment: CellAlignment,
    ) -> Result<()> {
        let height = row.iter().map(Vec::len).max().unwrap_or(1);
        for line in 0..height {
            let cells: Vec<String> = row
                .iter()
                .zip(widths)
                .map(|(lines, &width)| {
                    let text = lines.get(line).map(String::as_str).unwrap_or("");
                    pad(text, width, alignment)
                })
                .collect();
            writeln!(output, "| {} |", cells.join(" | "))
                .map_err(|e| StatsError::internal(e.to_string()))?;
        }
        Ok(())
    }
}

fn pad(text: &str, width: usize, alignment: CellAlignment) -> String {
    let fill = width.saturating_sub(text.chars().count());
    match alignment {
        CellAlignment::Left => format!("{text}{}", " ".repeat(fill)),
        CellAlignment::Right => format!("{}{text}", " ".repeat(fill)),
        CellAlignment::Center => {
            let left = fill / 2;
            format!("{}{text}{}", " ".repeat(left), " ".repeat(fill - left))
        }
    }
}

impl TableFormatter for MarkdownFormatter {
    fn format(&self, table: &StatsTable) -> Result<String> {
        self.render(table, &self.config)
    }

    fn format_with_config(&self, table: &StatsTable, config: &DisplayConfig) -> Result<String> {
        self.render(table, config)
    }
}

/// Renders tables as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with pretty printing.
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Sets whether to pretty-print the JSON output.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFormatter for JsonFormatter {
    fn format(&self, table: &StatsTable) -> Result<String> {
        if self.pretty {
            table.to_json()
        } else {
            Ok(serde_json::to_string(table)?)
        }
    }
}
