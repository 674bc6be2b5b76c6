//! Page-sized views over an already-fetched result.
//!
//! Paging never goes back to the database and keeps no session state: the
//! same `(result, page, page_size)` always yields the same [`Page`].

use crate::config::{DisplayConfig, DEFAULT_PAGE_SIZE};
use crate::query::TabularResult;

/// One window of rows plus the navigation around it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// The rows of this page, or the input unchanged for pass-through cases.
    pub result: TabularResult,
    /// 1-based page number actually shown.
    pub page: usize,
    /// Number of pages for this page size.
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl Page {
    fn single(result: TabularResult) -> Self {
        Self {
            result,
            page: 1,
            total_pages: 1,
            has_previous: false,
            has_next: false,
        }
    }

    /// Available navigation keys, or `None` when there is only one page.
    pub fn navigation_hint(&self) -> Option<String> {
        if self.total_pages <= 1 {
            return None;
        }
        let mut parts = Vec::with_capacity(3);
        if self.has_previous {
            parts.push("[P]revious page");
        }
        if self.has_next {
            parts.push("[N]ext page");
        }
        parts.push("[Q]uit paging");
        Some(parts.join("  "))
    }

    /// Page to request after `command`, or `None` to stop paging.
    ///
    /// Moving past either end stays on the current page.
    pub fn target(&self, command: PageCommand) -> Option<usize> {
        match command {
            PageCommand::Previous if self.has_previous => Some(self.page - 1),
            PageCommand::Next if self.has_next => Some(self.page + 1),
            PageCommand::Previous | PageCommand::Next => Some(self.page),
            PageCommand::Quit => None,
        }
    }
}

/// A navigation key typed while paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCommand {
    Previous,
    Next,
    Quit,
}

impl PageCommand {
    /// Parses `p`, `n` or `q` (trimmed, any case).
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "p" => Some(Self::Previous),
            "n" => Some(Self::Next),
            "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Slices tabular results into pages.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    default_page_size: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Paginator {
    /// Uses the configured page size as the fallback for non-positive sizes.
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            default_page_size: if config.page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                config.page_size
            },
        }
    }

    /// Size used when a caller passes a page size of zero or less.
    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    /// Returns page `page` of `result` with `page_size` rows per page.
    ///
    /// `page` is clamped into `1..=total_pages`. Failed and non-tabular
    /// results pass through unchanged; a tabular result without rows passes
    /// through with the message `No data found.`.
    pub fn paginate(&self, result: &TabularResult, page: i64, page_size: i64) -> Page {
        let rows = match result.data() {
            Some(rows) if result.is_success() => rows,
            _ => return Page::single(result.clone()),
        };
        if rows.is_empty() {
            return Page::single(result.with_message("No data found."));
        }

        let size = usize::try_from(page_size)
            .ok()
            .filter(|size| *size > 0)
            .unwrap_or(self.default_page_size);
        let total = rows.len();
        let total_pages = total.div_ceil(size);
        let page = usize::try_from(page.max(1)).unwrap_or(1).min(total_pages);

        let start = (page - 1) * size;
        let end = (start + size).min(total);
        let message = format!(
            "Page {page} of {total_pages} (rows {}-{end} of {total})",
            start + 1
        );

        Page {
            result: TabularResult::rows(message, rows.slice(start, end), result.execution_time()),
            page,
            total_pages,
            has_previous: page > 1,
            has_next: page < total_pages,
        }
    }
}
