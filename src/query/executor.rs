//! Query execution over a caller-supplied connection.
//!
//! Every public method returns a [`TabularResult`]; driver errors and a
//! missing connection come back as failed results, never as `Err` or panics.
//! Statements run one at a time, each awaited to completion. Nothing here
//! enforces a timeout.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::classify::{classify, has_multiple_statements, split_statements, StatementKind};
use super::result::TabularResult;
use crate::db::{DatabaseClient, RowSet, StatementOutput, Value};
use crate::error::{Result, TabulaError};

/// Message used when no usable connection is available.
pub const NO_CONNECTION_MESSAGE: &str = "No database connection available";

/// Message used for blank statement text.
pub const EMPTY_STATEMENT_MESSAGE: &str = "Empty SQL statement";

/// Message used when single-statement text holds more than one statement.
pub const MULTIPLE_STATEMENTS_MESSAGE: &str =
    "Multiple SQL statements are not allowed here; run them as a batch";

/// Runs SQL text against an optional client and builds results.
#[derive(Clone, Copy)]
pub struct QueryExecutor<'a> {
    db: Option<&'a dyn DatabaseClient>,
}

impl<'a> QueryExecutor<'a> {
    /// Creates an executor over an open client.
    pub fn new(db: &'a dyn DatabaseClient) -> Self {
        Self { db: Some(db) }
    }

    /// Creates an executor that may have no client at all.
    pub fn with_client(db: Option<&'a dyn DatabaseClient>) -> Self {
        Self { db }
    }

    /// Returns the client if present and not closed.
    pub(crate) fn client(&self) -> Option<&'a dyn DatabaseClient> {
        self.db.filter(|db| !db.is_closed())
    }

    /// Classifies and runs one statement.
    ///
    /// Statements starting with `select`, `show`, `describe`, `explain` or
    /// `with` are fetched as rows; anything else is run for its
    /// affected-row count. Text holding a second statement after a `;` is
    /// rejected without touching the database; batches go through
    /// [`execute_multiple`](Self::execute_multiple).
    pub async fn execute(&self, sql: &str) -> TabularResult {
        let Some(db) = self.client() else {
            return no_connection();
        };
        let sql = sql.trim();
        if let Some(rejected) = reject_statement(sql) {
            return rejected;
        }
        let Some(kind) = classify(sql) else {
            return TabularResult::failure(EMPTY_STATEMENT_MESSAGE, Duration::ZERO);
        };

        debug!("Executing {} statement: {}", kind, sql);
        let start = Instant::now();
        let outcome = match kind {
            StatementKind::RowProducing => db.query(sql).await.map(StatementOutput::Rows),
            StatementKind::Mutation => db.execute(sql).await.map(StatementOutput::Affected),
        };

        finish(sql, outcome, start.elapsed())
    }

    /// Runs one statement with positional `?` parameters.
    ///
    /// Whether the result is tabular comes from the driver, not from the
    /// statement text. Parameters are bound as given; nothing is validated.
    pub async fn execute_prepared(&self, sql: &str, params: &[Value]) -> TabularResult {
        let Some(db) = self.client() else {
            return no_connection();
        };
        let sql = sql.trim();
        if let Some(rejected) = reject_statement(sql) {
            return rejected;
        }

        debug!("Executing prepared statement with {} parameter(s): {}", params.len(), sql);
        let start = Instant::now();
        let outcome = db.execute_prepared(sql, params).await;

        finish(sql, outcome, start.elapsed())
    }

    /// Splits a batch on `;` and runs each non-empty statement in order.
    ///
    /// A failing statement does not stop the ones after it.
    pub async fn execute_multiple(&self, batch: &str) -> Vec<TabularResult> {
        let statements = split_statements(batch);
        debug!("Executing batch of {} statement(s)", statements.len());

        let mut results = Vec::with_capacity(statements.len());
        for statement in statements {
            results.push(self.execute(statement).await);
        }
        results
    }

    /// Prepares a statement without running it to surface syntax errors.
    ///
    /// Some servers do work at prepare time; that is outside this check's
    /// control.
    pub async fn validate(&self, sql: &str) -> TabularResult {
        let Some(db) = self.client() else {
            return no_connection();
        };

        let sql = sql.trim();
        if let Some(rejected) = reject_statement(sql) {
            return rejected;
        }

        let start = Instant::now();
        let outcome = db.prepare(sql).await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(()) => TabularResult::status("SQL syntax is valid", elapsed),
            Err(e) => {
                debug!("Validation failed: {}", e);
                TabularResult::failure(format!("SQL syntax error: {}", e.detail()), elapsed)
            }
        }
    }

    /// Lists tables through catalog introspection.
    pub async fn list_tables(&self) -> TabularResult {
        let Some(db) = self.client() else {
            return no_connection();
        };

        let start = Instant::now();
        let outcome = db.list_tables().await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(rows) => {
                let message = format!(
                    "Tables list: {} table(s) in {} ms",
                    rows.len(),
                    elapsed.as_millis()
                );
                TabularResult::rows(message, rows, elapsed)
            }
            Err(e) => {
                warn!("Failed to list tables: {}", e);
                TabularResult::failure(format!("Failed to get tables: {}", e.detail()), elapsed)
            }
        }
    }
}

pub(crate) fn no_connection() -> TabularResult {
    warn!("{}", NO_CONNECTION_MESSAGE);
    TabularResult::failure(NO_CONNECTION_MESSAGE, Duration::ZERO)
}

/// Fails text that is blank or holds several statements, before any
/// driver call.
fn reject_statement(sql: &str) -> Option<TabularResult> {
    if sql.is_empty() {
        return Some(TabularResult::failure(EMPTY_STATEMENT_MESSAGE, Duration::ZERO));
    }
    if has_multiple_statements(sql) {
        warn!("Rejected multi-statement text: {}", sql);
        return Some(TabularResult::failure(
            MULTIPLE_STATEMENTS_MESSAGE,
            Duration::ZERO,
        ));
    }
    None
}

/// Turns a driver outcome into a result with timing in its message.
fn finish(sql: &str, outcome: Result<StatementOutput>, elapsed: Duration) -> TabularResult {
    let ms = elapsed.as_millis();
    match outcome {
        Ok(StatementOutput::Rows(rows)) => {
            debug!("Statement returned {} row(s) in {} ms", rows.len(), ms);
            rows_result(rows, elapsed)
        }
        Ok(StatementOutput::Affected(count)) => {
            debug!("Statement affected {} row(s) in {} ms", count, ms);
            TabularResult::affected(format!("Update completed in {ms} ms"), count, elapsed)
        }
        Err(e) => failed(sql, e, elapsed),
    }
}

fn rows_result(rows: RowSet, elapsed: Duration) -> TabularResult {
    let message = format!("{} row(s) in {} ms", rows.len(), elapsed.as_millis());
    TabularResult::rows(message, rows, elapsed)
}

fn failed(sql: &str, error: TabulaError, elapsed: Duration) -> TabularResult {
    let ms = elapsed.as_millis();
    warn!("Statement failed after {} ms: {} ({})", ms, error, sql);
    let message = match error {
        TabulaError::Query(_) => format!("SQL error: {} (took {ms} ms)", error.detail()),
        other => format!("{other} (took {ms} ms)"),
    };
    TabularResult::failure(message, elapsed)
}
