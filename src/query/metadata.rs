//! Catalog lookups rendered as tabular results.

use std::time::Instant;

use tracing::warn;

use super::executor::no_connection;
use super::result::TabularResult;
use crate::db::{DatabaseClient, RowSet};

/// Describes tables and the server using connection introspection.
#[derive(Clone, Copy)]
pub struct MetadataInspector<'a> {
    db: Option<&'a dyn DatabaseClient>,
}

impl<'a> MetadataInspector<'a> {
    pub fn new(db: &'a dyn DatabaseClient) -> Self {
        Self { db: Some(db) }
    }

    pub fn with_client(db: Option<&'a dyn DatabaseClient>) -> Self {
        Self { db }
    }

    fn client(&self) -> Option<&'a dyn DatabaseClient> {
        self.db.filter(|db| !db.is_closed())
    }

    /// Column name, type, nullability and default for one table.
    ///
    /// An unknown table yields an empty tabular result.
    pub async fn describe_table(&self, table: &str) -> TabularResult {
        let Some(db) = self.client() else {
            return no_connection();
        };

        let start = Instant::now();
        match db.describe_table(table).await {
            Ok(rows) => TabularResult::rows(format!("Columns in {table}"), rows, start.elapsed()),
            Err(e) => {
                warn!("Failed to describe table {}: {}", table, e);
                TabularResult::failure(
                    format!("Failed to get table info: {}", e.detail()),
                    start.elapsed(),
                )
            }
        }
    }

    /// One row whose columns are the server's product and version facts.
    pub async fn database_info(&self) -> TabularResult {
        let Some(db) = self.client() else {
            return no_connection();
        };

        let start = Instant::now();
        let facts = match db.server_info().await {
            Ok(facts) => facts,
            Err(e) => {
                warn!("Failed to read server info: {}", e);
                return TabularResult::failure(
                    format!("Failed to get database info: {}", e.detail()),
                    start.elapsed(),
                );
            }
        };

        let (names, values): (Vec<String>, Vec<_>) = facts.into_iter().unzip();
        let mut rows = RowSet::new(names);
        if let Err(e) = rows.push_row(values) {
            return TabularResult::failure(e.to_string(), start.elapsed());
        }
        TabularResult::rows("Database information", rows, start.elapsed())
    }
}
