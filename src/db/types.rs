//! Value and row-set types shared by the database adapters.
//!
//! A [`RowSet`] keeps the column labels and every cell in one flat vector,
//! so each row is a slice whose width always equals the column count.

use crate::error::{Result, TabulaError};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Format used to render timestamps as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Represents a single value from a database query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Text/string value.
    String(String),

    /// Binary data.
    Bytes(Vec<u8>),

    /// Date and time without a zone; zoned values are normalized to UTC.
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts the value to its display text. NULL renders as `NULL`.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
            Value::Timestamp(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Returns the display text, or `None` for NULL.
    pub fn to_field_string(&self) -> Option<String> {
        (!self.is_null()).then(|| self.to_display_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(s) => f.write_str(s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

/// Column labels plus row-major cells.
///
/// Labels are kept verbatim, duplicates included; rows are addressed by
/// position only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    columns: Vec<String>,
    cells: Vec<Value>,
    len: usize,
}

impl RowSet {
    /// Creates an empty row set with the given column labels.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            cells: Vec::new(),
            len: 0,
        }
    }

    /// Builds a row set from whole rows, rejecting any row of the wrong width.
    pub fn from_rows<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new(columns);
        set.cells.reserve(rows.len() * set.width());
        for row in rows {
            set.push_row(row)?;
        }
        Ok(set)
    }

    /// Appends one row. Its length must equal the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.width() {
            return Err(TabulaError::internal(format!(
                "row has {} values but the result has {} columns",
                row.len(),
                self.width()
            )));
        }
        self.cells.extend(row);
        self.len += 1;
        Ok(())
    }

    /// Column labels in result order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the row at `index`, if any.
    pub fn row(&self, index: usize) -> Option<&[Value]> {
        if index >= self.len {
            return None;
        }
        let width = self.width();
        Some(&self.cells[index * width..(index + 1) * width])
    }

    /// Iterates rows in result order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[Value]> + '_ {
        let width = self.width();
        (0..self.len).map(move |i| &self.cells[i * width..(i + 1) * width])
    }

    /// Copies rows `[start, end)` into a new row set with the same columns.
    /// Bounds are clamped to the available rows.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.len);
        let start = start.min(end);
        let width = self.width();
        Self {
            columns: self.columns.clone(),
            cells: self.cells[start * width..end * width].to_vec(),
            len: end - start,
        }
    }
}

/// What a statement produced, as reported by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementOutput {
    /// The statement produced a result set.
    Rows(RowSet),
    /// The statement produced an affected-row count.
    Affected(u64),
}
