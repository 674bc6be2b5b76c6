//! CSV and fixed-width text export of tabular results.
//!
//! Only successful tabular results can be exported. Any failure, including a
//! write that fails halfway, is returned as `TabulaError::Export`; a partly
//! written file may remain on disk.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::{error, info};

use crate::config::ExportConfig;
use crate::db::RowSet;
use crate::error::{Result, TabulaError};
use crate::query::TabularResult;
use crate::render::ColumnLayout;

/// Timestamp format used in generated file names.
const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Timestamp format used in the text export header.
const HEADER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Text,
}

impl ExportFormat {
    /// File extension including the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Text => ".txt",
        }
    }
}

/// What a successful export wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// Writes results to files.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    directory: Option<PathBuf>,
}

impl Exporter {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            directory: config.directory.clone(),
        }
    }

    /// Writes a header line of column labels and one line per row.
    /// NULL becomes an empty field.
    pub fn export_csv(&self, result: &TabularResult, path: &str) -> Result<ExportSummary> {
        self.export(result, path, ExportFormat::Csv)
    }

    /// Writes a short header block followed by a bordered table.
    /// NULL is written as `NULL`.
    pub fn export_text(&self, result: &TabularResult, path: &str) -> Result<ExportSummary> {
        self.export(result, path, ExportFormat::Text)
    }

    /// Exports `result` in the given format.
    ///
    /// An empty `path` becomes `export_<yyyyMMdd_HHmmss>` in the configured
    /// directory; the format's extension is appended unless already present
    /// (any case).
    pub fn export(
        &self,
        result: &TabularResult,
        path: &str,
        format: ExportFormat,
    ) -> Result<ExportSummary> {
        let rows = match result.data() {
            Some(rows) if result.is_success() => rows,
            _ => {
                let err = TabulaError::export(format!("Cannot export: {}", result.message()));
                error!("{}", err);
                return Err(err);
            }
        };

        let target = self.resolve_path(path, format);
        let written = match format {
            ExportFormat::Csv => write_csv(&target, rows),
            ExportFormat::Text => write_text(&target, rows),
        };

        match written {
            Ok(()) => {
                info!("Exported {} row(s) to {}", rows.len(), target.display());
                Ok(ExportSummary {
                    path: target,
                    rows: rows.len(),
                })
            }
            Err(e) => {
                error!("Export to {} failed: {}", target.display(), e);
                Err(e)
            }
        }
    }

    /// Works out the file an export will be written to.
    pub fn resolve_path(&self, path: &str, format: ExportFormat) -> PathBuf {
        let ext = format.extension();
        let path = path.trim();

        if path.is_empty() {
            let name = format!("export_{}{ext}", Local::now().format(FILE_TIMESTAMP_FORMAT));
            return match &self.directory {
                Some(dir) => dir.join(name),
                None => PathBuf::from(name),
            };
        }

        if path.to_lowercase().ends_with(ext) {
            PathBuf::from(path)
        } else {
            PathBuf::from(format!("{path}{ext}"))
        }
    }
}

fn write_csv(path: &Path, rows: &RowSet) -> Result<()> {
    let terminator = if cfg!(windows) {
        Terminator::CRLF
    } else {
        Terminator::Any(b'\n')
    };
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(terminator)
        .from_writer(BufWriter::new(File::create(path)?));

    writer.write_record(rows.columns())?;
    for row in rows.rows() {
        writer.write_record(row.iter().map(|value| value.to_field_string().unwrap_or_default()))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_text(path: &Path, rows: &RowSet) -> Result<()> {
    let mut text = String::new();
    let generated = Local::now().format(HEADER_TIMESTAMP_FORMAT);
    write!(
        text,
        "Database Export\nGenerated: {generated}\nTotal Rows: {}\n\n",
        rows.len()
    )
    .and_then(|()| ColumnLayout::for_rows(rows).write_table(&mut text, rows))
    .map_err(|e| TabulaError::export(format!("Failed to format table: {e}")))?;

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(text.as_bytes())?;
    writer.flush()?;
    Ok(())
}
