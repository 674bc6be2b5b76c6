//! Error types for Tabula.
//!
//! Internal layers return [`Result`]; the public query, paging and rendering
//! boundaries turn these into values instead of propagating them.

use thiserror::Error;

/// Main error type for Tabula operations.
#[derive(Error, Debug)]
pub enum TabulaError {
    /// No usable database connection (absent or already closed).
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement preparation or execution errors reported by the driver.
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, bad connection string, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Export errors (nothing to export, I/O failure while writing).
    #[error("Export error: {0}")]
    Export(String),

    /// Internal invariant violations (row shape mismatch, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TabulaError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an export error with the given message.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Export(_) => "Export Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the bare message without the category prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Connection(msg)
            | Self::Query(msg)
            | Self::Config(msg)
            | Self::Export(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

impl From<std::io::Error> for TabulaError {
    fn from(err: std::io::Error) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<csv::Error> for TabulaError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias using TabulaError.
pub type Result<T> = std::result::Result<T, TabulaError>;
