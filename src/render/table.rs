//! Plain-text rendering of query results.
//!
//! Tabular results become bordered tables, mutations a status line and
//! failures an error line. Rendering never fails outright: if formatting
//! breaks, a tab-separated dump of the same data is returned instead.

use std::fmt::{self, Write as _};
use std::io;

use tracing::warn;

use super::layout::ColumnLayout;
use crate::db::Value;
use crate::query::TabularResult;

/// Renders one [`TabularResult`] as text.
pub struct TableRenderer<'a> {
    result: &'a TabularResult,
}

impl<'a> TableRenderer<'a> {
    /// Creates a renderer for the given result.
    pub fn new(result: &'a TabularResult) -> Self {
        Self { result }
    }

    /// Renders the whole result to a string without a trailing newline.
    ///
    /// Failures render as `Error: <message>`.
    pub fn render(&self) -> String {
        if !self.result.is_success() {
            return format!("Error: {}", self.result.message());
        }
        self.render_success()
    }

    /// Writes the result for a terminal: failures go to `err` (message only),
    /// everything else to `out`. Write errors are logged, not returned.
    pub fn display<O, E>(&self, out: &mut O, err: &mut E)
    where
        O: io::Write,
        E: io::Write,
    {
        let written = if self.result.is_success() {
            writeln!(out, "{}", self.render_success())
        } else {
            writeln!(err, "{}", self.result.message())
        };

        if let Err(e) = written {
            warn!("Failed to write rendered result: {}", e);
        }
    }

    fn render_success(&self) -> String {
        match self.try_render() {
            Ok(text) => text,
            Err(_) => {
                warn!("Table formatting failed, falling back to plain dump");
                self.fallback_dump()
            }
        }
    }

    fn try_render(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        let result = self.result;

        let Some(rows) = result.data() else {
            write!(
                out,
                "{}\n{} row(s) affected",
                result.message(),
                result.row_count()
            )?;
            return Ok(out);
        };

        if rows.is_empty() {
            write!(out, "No data found.\n{}", result.message())?;
            return Ok(out);
        }

        ColumnLayout::for_rows(rows).write_table(&mut out, rows)?;
        write!(
            out,
            "{} row(s) returned\n{}",
            result.row_count(),
            result.message()
        )?;
        Ok(out)
    }

    /// Tab-separated header and rows followed by the usual count lines.
    fn fallback_dump(&self) -> String {
        let mut lines = Vec::new();
        if let Some(rows) = self.result.data() {
            lines.push(rows.columns().join("\t"));
            for row in rows.rows() {
                let cells: Vec<String> = row.iter().map(Value::to_display_string).collect();
                lines.push(cells.join("\t"));
            }
            lines.push(format!("{} row(s) returned", self.result.row_count()));
        } else {
            lines.push(format!("{} row(s) affected", self.result.row_count()));
        }
        lines.push(self.result.message().to_string());
        lines.join("\n")
    }
}
