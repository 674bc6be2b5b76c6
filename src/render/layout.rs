//! Column width computation and bordered-line formatting.
//!
//! Shared by the terminal renderer and the text exporter so both produce the
//! same table for the same rows.

use std::fmt::{self, Write};

use crate::db::{RowSet, Value};
use crate::query::TabularResult;

/// Minimum width for any column.
pub const MIN_COLUMN_WIDTH: usize = 4;

/// Per-column display widths, in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    widths: Vec<usize>,
}

impl ColumnLayout {
    /// Computes widths from column labels and rows.
    ///
    /// Each width is the largest of [`MIN_COLUMN_WIDTH`], the label length and
    /// every cell's text length (NULL counts as `NULL`). Cells are matched to
    /// columns by position.
    pub fn compute<'r, I>(columns: &[String], rows: I) -> Self
    where
        I: IntoIterator<Item = &'r [Value]>,
    {
        let mut widths: Vec<usize> = columns
            .iter()
            .map(|name| text_width(name).max(MIN_COLUMN_WIDTH))
            .collect();

        for row in rows {
            for (width, value) in widths.iter_mut().zip(row) {
                *width = (*width).max(text_width(&value.to_display_string()));
            }
        }

        Self { widths }
    }

    /// Layout for a row set.
    pub fn for_rows(rows: &RowSet) -> Self {
        Self::compute(rows.columns(), rows.rows())
    }

    /// Layout for a result; non-tabular results have no columns.
    pub fn for_result(result: &TabularResult) -> Self {
        match result.data() {
            Some(rows) => Self::for_rows(rows),
            None => Self { widths: Vec::new() },
        }
    }

    /// Widths in column order.
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Writes `+------+----+` followed by a newline.
    pub fn write_border<W: Write>(&self, out: &mut W) -> fmt::Result {
        out.write_char('+')?;
        for width in &self.widths {
            for _ in 0..width + 2 {
                out.write_char('-')?;
            }
            out.write_char('+')?;
        }
        out.write_char('\n')
    }

    /// Writes `| cell | cell |` followed by a newline, left-aligning each cell
    /// in its column.
    pub fn write_row<W, I, S>(&self, out: &mut W, cells: I) -> fmt::Result
    where
        W: Write,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        out.write_char('|')?;
        for (cell, width) in cells.into_iter().zip(&self.widths) {
            write!(out, " {:<width$} |", cell.as_ref(), width = *width)?;
        }
        out.write_char('\n')
    }

    /// Writes border, header, border, one line per row, border.
    pub fn write_table<W: Write>(&self, out: &mut W, rows: &RowSet) -> fmt::Result {
        self.write_border(out)?;
        self.write_row(out, rows.columns())?;
        self.write_border(out)?;
        for row in rows.rows() {
            self.write_row(out, row.iter().map(Value::to_display_string))?;
        }
        self.write_border(out)
    }
}

/// Display width of `text`, counted in characters.
pub fn text_width(text: &str) -> usize {
    text.chars().count()
}
