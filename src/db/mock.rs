//! Mock database client for testing.
//!
//! Returns scripted responses keyed by statement text and records every call,
//! so tests can see which execution path a statement took.

use super::{DatabaseBackend, DatabaseClient, RowSet, StatementOutput, Value};
use crate::error::{Result, TabulaError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// One recorded call against the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Query(String),
    Execute(String),
    Prepared(String, Vec<Value>),
    Prepare(String),
    ListTables,
    DescribeTable(String),
    ServerInfo,
}

#[derive(Debug, Clone)]
enum Scripted {
    Rows(RowSet),
    Affected(u64),
    Error(String),
}

/// A mock database client that returns predefined results.
///
/// Unscripted row-producing statements return one `result` column echoing
/// the SQL; unscripted mutations affect zero rows.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    scripted: HashMap<String, Scripted>,
    tables: RowSet,
    calls: Mutex<Vec<MockCall>>,
    closed: AtomicBool,
}

impl MockDatabaseClient {
    /// Creates a new mock with no scripted statements and no tables.
    pub fn new() -> Self {
        Self {
            tables: RowSet::new(super::TABLE_CATALOG_COLUMNS),
            ..Self::default()
        }
    }

    /// Scripts `sql` to return the given rows.
    pub fn with_rows(mut self, sql: &str, rows: RowSet) -> Self {
        self.scripted.insert(sql.trim().to_string(), Scripted::Rows(rows));
        self
    }

    /// Scripts `sql` to report an affected-row count.
    pub fn with_affected(mut self, sql: &str, count: u64) -> Self {
        self.scripted
            .insert(sql.trim().to_string(), Scripted::Affected(count));
        self
    }

    /// Scripts `sql` to fail with the given driver message.
    pub fn with_error(mut self, sql: &str, message: &str) -> Self {
        self.scripted
            .insert(sql.trim().to_string(), Scripted::Error(message.to_string()));
        self
    }

    /// Sets the table names returned by catalog introspection.
    pub fn with_tables(mut self, names: &[&str]) -> Self {
        let mut tables = RowSet::new(super::TABLE_CATALOG_COLUMNS);
        for name in names {
            // Width always matches the catalog columns.
            let _ = tables.push_row(vec![
                Value::from("main"),
                Value::from(*name),
                Value::from("TABLE"),
            ]);
        }
        self.tables = tables;
        self
    }

    /// Returns a copy of every call made so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: MockCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn lookup(&self, sql: &str) -> Option<&Scripted> {
        self.scripted.get(sql.trim())
    }

    fn echo(sql: &str) -> RowSet {
        let mut rows = RowSet::new(["result"]);
        let _ = rows.push_row(vec![Value::String(format!("Mock result for: {sql}"))]);
        rows
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    async fn query(&self, sql: &str) -> Result<RowSet> {
        self.record(MockCall::Query(sql.to_string()));
        match self.lookup(sql) {
            Some(Scripted::Rows(rows)) => Ok(rows.clone()),
            Some(Scripted::Affected(_)) => Ok(RowSet::default()),
            Some(Scripted::Error(msg)) => Err(TabulaError::query(msg.clone())),
            None => Ok(Self::echo(sql)),
        }
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        self.record(MockCall::Execute(sql.to_string()));
        match self.lookup(sql) {
            Some(Scripted::Rows(_)) | None => Ok(0),
            Some(Scripted::Affected(count)) => Ok(*count),
            Some(Scripted::Error(msg)) => Err(TabulaError::query(msg.clone())),
        }
    }

    async fn execute_prepared(&self, sql: &str, params: &[Value]) -> Result<StatementOutput> {
        self.record(MockCall::Prepared(sql.to_string(), params.to_vec()));
        match self.lookup(sql) {
            Some(Scripted::Rows(rows)) => Ok(StatementOutput::Rows(rows.clone())),
            Some(Scripted::Affected(count)) => Ok(StatementOutput::Affected(*count)),
            Some(Scripted::Error(msg)) => Err(TabulaError::query(msg.clone())),
            None => Ok(StatementOutput::Affected(0)),
        }
    }

    async fn prepare(&self, sql: &str) -> Result<()> {
        self.record(MockCall::Prepare(sql.to_string()));
        match self.lookup(sql) {
            Some(Scripted::Error(msg)) => Err(TabulaError::query(msg.clone())),
            _ => Ok(()),
        }
    }

    async fn list_tables(&self) -> Result<RowSet> {
        self.record(MockCall::ListTables);
        Ok(self.tables.clone())
    }

    async fn describe_table(&self, table: &str) -> Result<RowSet> {
        self.record(MockCall::DescribeTable(table.to_string()));
        Ok(RowSet::new(super::COLUMN_CATALOG_COLUMNS))
    }

    async fn server_info(&self) -> Result<Vec<(String, Value)>> {
        self.record(MockCall::ServerInfo);
        Ok(vec![
            ("Database Product".to_string(), Value::from("Mock")),
            ("Database Version".to_string(), Value::from("0")),
        ])
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
