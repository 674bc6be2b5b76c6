//! SQLite database client implementation.
//!
//! Wraps a single-connection `sqlx` pool so that an in-memory database lives
//! as long as the client does.

use crate::db::{DatabaseBackend, DatabaseClient, RowSet, StatementOutput, Value};
use crate::error::{Result, TabulaError};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, Sqlite, Statement, TypeInfo, ValueRef};
use std::str::FromStr;
use tracing::debug;

const LIST_TABLES_SQL: &str = r#"
    SELECT 'main' AS TABLE_SCHEMA, name AS TABLE_NAME, 'TABLE' AS TABLE_TYPE
    FROM sqlite_master
    WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
    ORDER BY name
"#;

const DESCRIBE_TABLE_SQL: &str = r#"
    SELECT
        name AS COLUMN_NAME,
        type AS DATA_TYPE,
        CASE WHEN "notnull" = 1 THEN 'NO' ELSE 'YES' END AS IS_NULLABLE,
        dflt_value AS COLUMN_DEFAULT
    FROM pragma_table_info(?)
    ORDER BY cid
"#;

/// SQLite database client.
#[derive(Debug, Clone)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Wraps an existing pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens `sqlite::memory:` or `sqlite://path` (created if missing).
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| TabulaError::connection(format!("Invalid SQLite URL '{url}': {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| TabulaError::connection(e.to_string()))?;

        debug!("Opened SQLite database {}", url);
        Ok(Self { pool })
    }

    /// Asks the driver for the columns a statement would return.
    async fn statement_columns(&self, sql: &str) -> Result<Vec<String>> {
        let statement = self.pool.prepare(sql).await.map_err(query_error)?;
        Ok(statement
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect())
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    async fn query(&self, sql: &str) -> Result<RowSet> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        let columns = match rows.first() {
            Some(first) => first
                .columns()
                .iter()
                .map(|col| col.name().to_string())
                .collect(),
            None => self.statement_columns(sql).await?,
        };

        collect_rows(columns, &rows)
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        let done = sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(done.rows_affected())
    }

    async fn execute_prepared(&self, sql: &str, params: &[Value]) -> Result<StatementOutput> {
        let columns = self.statement_columns(sql).await?;
        let query = params.iter().fold(sqlx::query(sql), bind_value);

        if columns.is_empty() {
            let done = query.execute(&self.pool).await.map_err(query_error)?;
            Ok(StatementOutput::Affected(done.rows_affected()))
        } else {
            let rows = query.fetch_all(&self.pool).await.map_err(query_error)?;
            Ok(StatementOutput::Rows(collect_rows(columns, &rows)?))
        }
    }

    async fn prepare(&self, sql: &str) -> Result<()> {
        self.pool.prepare(sql).await.map_err(query_error)?;
        Ok(())
    }

    async fn list_tables(&self) -> Result<RowSet> {
        self.query(LIST_TABLES_SQL).await
    }

    async fn describe_table(&self, table: &str) -> Result<RowSet> {
        match self
            .execute_prepared(DESCRIBE_TABLE_SQL, &[Value::from(table)])
            .await?
        {
            StatementOutput::Rows(set) => Ok(set),
            StatementOutput::Affected(_) => Err(TabulaError::internal(
                "column catalog query returned no result set",
            )),
        }
    }

    async fn server_info(&self) -> Result<Vec<(String, Value)>> {
        let version: String = sqlx::query_scalar("SELECT sqlite_version()")
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;
        let query_only: i64 = sqlx::query_scalar("PRAGMA query_only")
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(vec![
            ("Database Product".to_string(), Value::from("SQLite")),
            ("Database Version".to_string(), Value::from(version)),
            ("Driver Name".to_string(), Value::from("sqlx-sqlite")),
            ("Read Only".to_string(), Value::Bool(query_only != 0)),
        ])
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

fn collect_rows(columns: Vec<String>, rows: &[SqliteRow]) -> Result<RowSet> {
    let mut set = RowSet::new(columns);
    for row in rows {
        set.push_row(convert_row(row))?;
    }
    Ok(set)
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::String(s) => query.bind(s.clone()),
        Value::Bytes(b) => query.bind(b.clone()),
        Value::Timestamp(ts) => query.bind(*ts),
    }
}

/// Converts a sqlx SqliteRow to a row of values.
fn convert_row(row: &SqliteRow) -> Vec<Value> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts one cell, using the declared column type when it carries
/// meaning SQLite's storage classes lack, and the stored class otherwise.
fn convert_value(row: &SqliteRow, index: usize, declared: &str) -> Value {
    let stored = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(_) => return undecodable(declared),
    };

    match declared.to_uppercase().as_str() {
        "BOOLEAN" | "BOOL" if stored == "INTEGER" => {
            if let Ok(i) = row.try_get_unchecked::<i64, _>(index) {
                return Value::Bool(i != 0);
            }
        }
        "DATETIME" | "TIMESTAMP" => {
            if let Ok(ts) = row.try_get_unchecked::<NaiveDateTime, _>(index) {
                return Value::Timestamp(ts);
            }
        }
        _ => {}
    }

    let value = match stored.as_str() {
        "INTEGER" => row.try_get_unchecked::<i64, _>(index).map(Value::Int),
        "REAL" => row.try_get_unchecked::<f64, _>(index).map(Value::Float),
        "BLOB" => row.try_get_unchecked::<Vec<u8>, _>(index).map(Value::Bytes),
        _ => row.try_get_unchecked::<String, _>(index).map(Value::String),
    };
    value.unwrap_or_else(|_| undecodable(&stored))
}

fn undecodable(type_name: &str) -> Value {
    Value::String(format!("<{type_name}>"))
}

fn query_error(error: sqlx::Error) -> TabulaError {
    match error.as_database_error() {
        Some(db_error) => TabulaError::query(db_error.message()),
        None => TabulaError::query(error.to_string()),
    }
}
