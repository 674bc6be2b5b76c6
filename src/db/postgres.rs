//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient`
//! trait for PostgreSQL databases using sqlx.

use crate::db::{DatabaseBackend, DatabaseClient, RowSet, StatementOutput, Value};
use crate::error::{Result, TabulaError};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::types::{Oid, PgInterval, PgMoney, PgTimeTz};
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column as SqlxColumn, Executor, Postgres, Row as SqlxRow, Statement, TypeInfo, ValueRef};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const LIST_TABLES_SQL: &str = r#"
    SELECT
        table_schema::text AS "TABLE_SCHEMA",
        table_name::text AS "TABLE_NAME",
        'TABLE' AS "TABLE_TYPE"
    FROM information_schema.tables
    WHERE table_schema NOT IN ('pg_catalog', 'information_schema')
        AND table_type = 'BASE TABLE'
    ORDER BY table_schema, table_name
"#;

const DESCRIBE_TABLE_SQL: &str = r#"
    SELECT
        column_name::text AS "COLUMN_NAME",
        data_type::text AS "DATA_TYPE",
        is_nullable::text AS "IS_NULLABLE",
        column_default::text AS "COLUMN_DEFAULT"
    FROM information_schema.columns
    WHERE table_schema NOT IN ('pg_catalog', 'information_schema')
        AND table_name = ?
    ORDER BY ordinal_position
"#;

/// PostgreSQL database client.
#[derive(Debug, Clone)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Creates a new PostgresClient from an existing connection pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a small pool for `postgres://` URLs. No retries.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .map_err(|e| TabulaError::connection(e.to_string()))?;

        debug!("Successfully connected to database");
        Ok(Self { pool })
    }

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
impl DatabaseClient for PostgresClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgres
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
        let sql = numbered_placeholders(sql);
        let columns = self.statement_columns(&sql).await?;
        let query = params.iter().fold(sqlx::query(&sql), bind_value);

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
        let (version, database, user, read_only): (String, String, String, String) =
            sqlx::query_as(
                "SELECT version(), current_database()::text, current_user::text, \
                 current_setting('transaction_read_only')",
            )
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(vec![
            ("Database Product".to_string(), Value::from("PostgreSQL")),
            ("Database Version".to_string(), Value::from(version)),
            ("Driver Name".to_string(), Value::from("sqlx-postgres")),
            ("Database".to_string(), Value::from(database)),
            ("User".to_string(), Value::from(user)),
            ("Read Only".to_string(), Value::Bool(read_only == "on")),
        ])
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

fn collect_rows(columns: Vec<String>, rows: &[PgRow]) -> Result<RowSet> {
    let mut set = RowSet::new(columns);
    for row in rows {
        set.push_row(convert_row(row))?;
    }
    Ok(set)
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &Value,
) -> Query<'q, Postgres, PgArguments> {
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

/// Rewrites `?` placeholders to PostgreSQL's `$1, $2, ...`.
///
/// Question marks inside quoted literals or identifiers, `--` and `/* */`
/// comments and `$tag$` dollar-quoted bodies are left alone. Every other `?`
/// is a placeholder, so the jsonb `?`, `?|` and `?&` operators have to be
/// written as `jsonb_exists`, `jsonb_exists_any` and `jsonb_exists_all`.
fn numbered_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut next = 1;
    let mut rest = sql;

    while let Some(ch) = rest.chars().next() {
        let skipped = match ch {
            '?' => {
                out.push('$');
                out.push_str(&next.to_string());
                next += 1;
                rest = &rest[1..];
                continue;
            }
            '\'' | '"' => rest[1..].find(ch).map_or(rest.len(), |i| i + 2),
            '-' if rest.starts_with("--") => rest.find('\n').unwrap_or(rest.len()),
            '/' if rest.starts_with("/*") => rest[2..].find("*/").map_or(rest.len(), |i| i + 4),
            '$' => dollar_quoted_len(rest).unwrap_or(1),
            _ => ch.len_utf8(),
        };
        out.push_str(&rest[..skipped]);
        rest = &rest[skipped..];
    }

    out
}

/// Length of the dollar-quoted string at the start of `text`, or `None` if
/// the `$` does not open one (`$1` is a positional parameter, not a tag).
fn dollar_quoted_len(text: &str) -> Option<usize> {
    let tag_len = text[1..].find('$')?;
    let tag = &text[1..=tag_len];
    if tag.starts_with(|c: char| c.is_ascii_digit())
        || !tag.chars().all(|c| c.is_alphanumeric() || c == '_')
    {
        return None;
    }

    let delimiter = &text[..tag_len + 2];
    let body = &text[delimiter.len()..];
    Some(
        body.find(delimiter)
            .map_or(text.len(), |i| 2 * delimiter.len() + i),
    )
}

/// Converts a sqlx PgRow to a row of values.
fn convert_row(row: &PgRow) -> Vec<Value> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// How a column's values are read, chosen from its type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decode {
    Bool,
    Int2,
    Int4,
    Int8,
    Oid,
    Float4,
    Float8,
    Numeric,
    Money,
    Bytes,
    Timestamp,
    TimestampTz,
    Date,
    Time,
    TimeTz,
    Interval,
    Uuid,
    Json,
    Text,
}

fn decode_as(type_name: &str) -> Decode {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => Decode::Bool,
        "INT2" | "SMALLINT" => Decode::Int2,
        "INT4" | "INT" | "INTEGER" => Decode::Int4,
        "INT8" | "BIGINT" => Decode::Int8,
        "OID" => Decode::Oid,
        "FLOAT4" | "REAL" => Decode::Float4,
        "FLOAT8" | "DOUBLE PRECISION" => Decode::Float8,
        "NUMERIC" | "DECIMAL" => Decode::Numeric,
        "MONEY" => Decode::Money,
        "BYTEA" => Decode::Bytes,
        "TIMESTAMP" => Decode::Timestamp,
        "TIMESTAMPTZ" => Decode::TimestampTz,
        "DATE" => Decode::Date,
        "TIME" => Decode::Time,
        "TIMETZ" => Decode::TimeTz,
        "INTERVAL" => Decode::Interval,
        "UUID" => Decode::Uuid,
        "JSON" | "JSONB" => Decode::Json,
        _ => Decode::Text,
    }
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(_) => {}
        Err(_) => return undecodable(type_name),
    }

    let decoded = match decode_as(type_name) {
        Decode::Bool => row.try_get::<bool, _>(index).map(Value::Bool),
        Decode::Int2 => row.try_get::<i16, _>(index).map(|v| Value::Int(v.into())),
        Decode::Int4 => row.try_get::<i32, _>(index).map(|v| Value::Int(v.into())),
        Decode::Int8 => row.try_get::<i64, _>(index).map(Value::Int),
        Decode::Oid => row.try_get::<Oid, _>(index).map(|v| Value::Int(v.0.into())),
        Decode::Float4 => row.try_get::<f32, _>(index).map(|v| Value::Float(v.into())),
        Decode::Float8 => row.try_get::<f64, _>(index).map(Value::Float),
        Decode::Numeric => row
            .try_get::<Decimal, _>(index)
            .map(|v| Value::String(v.to_string())),
        Decode::Money => row
            .try_get::<PgMoney, _>(index)
            .map(|v| Value::String(v.to_decimal(2).to_string())),
        Decode::Bytes => row.try_get::<Vec<u8>, _>(index).map(Value::Bytes),
        Decode::Timestamp => row.try_get::<NaiveDateTime, _>(index).map(Value::Timestamp),
        Decode::TimestampTz => row
            .try_get::<DateTime<Utc>, _>(index)
            .map(|v| Value::Timestamp(v.naive_utc())),
        Decode::Date => row
            .try_get::<NaiveDate, _>(index)
            .map(|v| Value::String(v.to_string())),
        Decode::Time => row
            .try_get::<NaiveTime, _>(index)
            .map(|v| Value::String(v.to_string())),
        Decode::TimeTz => row
            .try_get::<PgTimeTz<NaiveTime, FixedOffset>, _>(index)
            .map(|v| Value::String(format!("{}{}", v.time, v.offset))),
        Decode::Interval => row
            .try_get::<PgInterval, _>(index)
            .map(|v| Value::String(format_interval(&v))),
        Decode::Uuid => row
            .try_get::<Uuid, _>(index)
            .map(|v| Value::String(v.to_string())),
        Decode::Json => row
            .try_get::<serde_json::Value, _>(index)
            .map(|v| Value::String(v.to_string())),
        Decode::Text => row.try_get::<String, _>(index).map(Value::String),
    };

    decoded.unwrap_or_else(|_| undecodable(type_name))
}

/// Formats an interval the way PostgreSQL prints it by default,
/// e.g. `1 year 2 mons 3 days 04:05:06.5`.
fn format_interval(interval: &PgInterval) -> String {
    let mut parts = Vec::new();
    let units = [
        (interval.months / 12, "year"),
        (interval.months % 12, "mon"),
        (interval.days, "day"),
    ];
    for (n, unit) in units {
        if n != 0 {
            let plural = if n.abs() == 1 { "" } else { "s" };
            parts.push(format!("{n} {unit}{plural}"));
        }
    }

    if interval.microseconds != 0 || parts.is_empty() {
        let sign = if interval.microseconds < 0 { "-" } else { "" };
        let total = interval.microseconds.unsigned_abs();
        let (secs, frac) = (total / 1_000_000, total % 1_000_000);
        let mut time = format!(
            "{sign}{:02}:{:02}:{:02}",
            secs / 3600,
            secs / 60 % 60,
            secs % 60
        );
        if frac != 0 {
            time.push('.');
            time.push_str(format!("{frac:06}").trim_end_matches('0'));
        }
        parts.push(time);
    }

    parts.join(" ")
}

fn undecodable(type_name: &str) -> Value {
    Value::String(format!("<{}>", type_name.to_lowercase()))
}

fn query_error(error: sqlx::Error) -> TabulaError {
    TabulaError::query(format_query_error(error))
}

/// Formats a query error with PostgreSQL detail and hint lines if available.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }
        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
        if let Some(constraint) = pg_error.constraint() {
            result.push_str("\n  CONSTRAINT: ");
            result.push_str(constraint);
        }
    }

    result
}
