//! Tabula - a tabular SQL query engine.
//!
//! Executes SQL against a caller-supplied connection and turns every outcome
//! into a [`query::TabularResult`], which can then be rendered as a bordered
//! text table, paged, or exported to CSV or text files.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod history;
pub mod logging;
pub mod paging;
pub mod query;
pub mod render;
