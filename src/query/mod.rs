//! Query execution and classification for Tabula.
//!
//! Turns SQL text plus a live connection into [`TabularResult`] values.

pub mod classify;
pub mod executor;
pub mod metadata;
pub mod result;

pub use classify::{classify, has_multiple_statements, split_statements, StatementKind};
pub use executor::{
    QueryExecutor, EMPTY_STATEMENT_MESSAGE, MULTIPLE_STATEMENTS_MESSAGE, NO_CONNECTION_MESSAGE,
};
pub use metadata::MetadataInspector;
pub use result::TabularResult;
