//! The value produced by every executed statement.

use crate::db::RowSet;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Outcome of one executed statement: a row set, an affected-row count, or
/// a failure.
///
/// Immutable once built; paging derives new instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabularResult {
    success: bool,
    message: String,
    data: Option<RowSet>,
    row_count: u64,
    #[serde(rename = "execution_time_ms", serialize_with = "serialize_millis")]
    execution_time: Duration,
}

impl TabularResult {
    /// A successful row-producing result. `row_count` is the number of rows.
    pub fn rows(message: impl Into<String>, data: RowSet, execution_time: Duration) -> Self {
        Self {
            success: true,
            message: message.into(),
            row_count: data.len() as u64,
            data: Some(data),
            execution_time,
        }
    }

    /// A successful mutation reporting how many rows it affected.
    pub fn affected(message: impl Into<String>, count: u64, execution_time: Duration) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            row_count: count,
            execution_time,
        }
    }

    /// A successful outcome that carries only a status message.
    pub fn status(message: impl Into<String>, execution_time: Duration) -> Self {
        Self::affected(message, 0, execution_time)
    }

    /// A failed outcome. Carries no rows or columns.
    pub fn failure(message: impl Into<String>, execution_time: Duration) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            row_count: 0,
            execution_time,
        }
    }

    /// Returns a copy carrying a different message.
    pub fn with_message(&self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..self.clone()
        }
    }

    /// Whether execution completed without error.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Human-readable status or error text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True iff the result carries a row set, even an empty one.
    pub fn is_tabular(&self) -> bool {
        self.data.is_some()
    }

    /// The row set, present only for tabular results.
    pub fn data(&self) -> Option<&RowSet> {
        self.data.as_ref()
    }

    /// Column labels in result order; empty for non-tabular results.
    pub fn columns(&self) -> &[String] {
        self.data.as_ref().map(RowSet::columns).unwrap_or_default()
    }

    /// Rows returned, or rows affected for mutations.
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Wall-clock time spent in the driver.
    pub fn execution_time(&self) -> Duration {
        self.execution_time
    }

    /// [`Self::execution_time`] in whole milliseconds.
    pub fn execution_time_ms(&self) -> u64 {
        u64::try_from(self.execution_time.as_millis()).unwrap_or(u64::MAX)
    }
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    u64::try_from(duration.as_millis())
        .unwrap_or(u64::MAX)
        .serialize(serializer)
}
