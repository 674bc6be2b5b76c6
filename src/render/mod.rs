//! Text rendering of results.

mod layout;
mod table;

pub use layout::{text_width, ColumnLayout, MIN_COLUMN_WIDTH};
pub use table::TableRenderer;
