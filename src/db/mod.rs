//! Database abstraction layer for Tabula.
//!
//! The query core never opens connections itself. Callers hand it a live
//! [`DatabaseClient`]; the adapters here wrap `sqlx` pools for SQLite and
//! PostgreSQL.

mod mock;
mod postgres;
mod sqlite;
mod types;

pub use mock::{MockCall, MockDatabaseClient};
pub use postgres::PostgresClient;
pub use sqlite::SqliteClient;
pub use types::{RowSet, StatementOutput, Value, TIMESTAMP_FORMAT};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Column labels used for table catalog listings.
pub const TABLE_CATALOG_COLUMNS: [&str; 3] = ["TABLE_SCHEMA", "TABLE_NAME", "TABLE_TYPE"];

/// Column labels used for per-table column listings.
pub const COLUMN_CATALOG_COLUMNS: [&str; 4] =
    ["COLUMN_NAME", "DATA_TYPE", "IS_NULLABLE", "COLUMN_DEFAULT"];

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::Postgres),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Returns the default port for this backend (0 when not networked).
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::Sqlite => 0,
        }
    }

    /// Returns the URL scheme for this backend.
    pub fn url_scheme(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Opens a client for the given configuration.
///
/// Convenience for hosts and tests; the query core itself only ever
/// receives an already-open client.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    let url = config.to_connection_string()?;
    match config.backend {
        DatabaseBackend::Postgres => Ok(Box::new(PostgresClient::connect(&url).await?)),
        DatabaseBackend::Sqlite => Ok(Box::new(SqliteClient::connect(&url).await?)),
    }
}

/// An open database connection as seen by the query core.
///
/// Implementations report driver failures as `TabulaError::Query` carrying
/// the driver's own message.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Returns which backend this client talks to.
    fn backend(&self) -> DatabaseBackend;

    /// Returns true once the connection can no longer be used.
    fn is_closed(&self) -> bool;

    /// Runs a statement that returns rows.
    ///
    /// Column labels are reported even when no rows come back. `sql` must be
    /// a single statement: some drivers run every statement in the text and
    /// merge their rows.
    async fn query(&self, sql: &str) -> Result<RowSet>;

    /// Runs a statement for its effect and returns the affected-row count.
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Prepares `sql`, binds `params` to its `?` placeholders in order, and
    /// runs it. Whether rows come back is decided by the prepared statement.
    ///
    /// The parameter count is not checked against the placeholders. SQLite
    /// binds NULL to unfilled placeholders and ignores extra parameters;
    /// PostgreSQL reports a mismatch as a driver error.
    async fn execute_prepared(&self, sql: &str, params: &[Value]) -> Result<StatementOutput>;

    /// Prepares `sql` without running it.
    async fn prepare(&self, sql: &str) -> Result<()>;

    /// Lists user tables from the catalog, labelled [`TABLE_CATALOG_COLUMNS`].
    async fn list_tables(&self) -> Result<RowSet>;

    /// Lists one table's columns from the catalog, labelled
    /// [`COLUMN_CATALOG_COLUMNS`].
    async fn describe_table(&self, table: &str) -> Result<RowSet>;

    /// Returns product and version facts about the server.
    async fn server_info(&self) -> Result<Vec<(String, Value)>>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
