//! Leading-keyword statement classification and batch splitting.
//!
//! This is a heuristic, not a parser. A statement whose first word is not in
//! [`ROW_PRODUCING_KEYWORDS`] is run as a mutation even if it would return
//! rows (a stored-procedure `CALL`, SQLite `PRAGMA`, a leading comment). Use
//! prepared execution when the driver's own answer is needed.

use std::fmt;

/// First words that mark a statement as row-producing.
pub const ROW_PRODUCING_KEYWORDS: [&str; 5] = ["select", "show", "describe", "explain", "with"];

/// How a statement will be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// Expected to return a result set.
    RowProducing,
    /// Expected to return an affected-row count (DML, DDL, anything else).
    Mutation,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowProducing => write!(f, "row-producing"),
            Self::Mutation => write!(f, "mutation"),
        }
    }
}

/// Returns the lower-cased first word of `sql`, or `None` if there is none.
///
/// A word is a run of ASCII letters, digits and underscores at the start of
/// the trimmed text.
pub fn leading_keyword(sql: &str) -> Option<String> {
    let trimmed = sql.trim_start();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(trimmed.len());
    let word = &trimmed[..end];
    (!word.is_empty()).then(|| word.to_ascii_lowercase())
}

/// Classifies a statement by its first word. Returns `None` for blank text.
pub fn classify(sql: &str) -> Option<StatementKind> {
    if sql.trim().is_empty() {
        return None;
    }

    let kind = match leading_keyword(sql) {
        Some(word) if ROW_PRODUCING_KEYWORDS.contains(&word.as_str()) => {
            StatementKind::RowProducing
        }
        _ => StatementKind::Mutation,
    };
    Some(kind)
}

/// Splits a batch on `;`, trims each piece and drops empty ones.
///
/// The split is naive: a `;` inside a string literal or comment ends the
/// statement early.
pub fn split_statements(batch: &str) -> Vec<&str> {
    batch
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .collect()
}

/// Returns true if `sql` holds a second statement after a `;`.
///
/// Unlike [`split_statements`] this skips quoted text and comments, so
/// `SELECT 'a;b'` and a trailing `; -- note` count as one statement.
pub fn has_multiple_statements(sql: &str) -> bool {
    #[derive(Clone, Copy)]
    enum State {
        Code,
        Quoted(char),
        LineComment,
        BlockComment,
    }

    let mut state = State::Code;
    let mut terminated = false;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            State::Quoted(q) if ch == q => state = State::Code,
            State::Quoted(_) => {}
            State::LineComment if ch == '\n' => state = State::Code,
            State::LineComment => {}
            State::BlockComment if ch == '*' && chars.peek() == Some(&'/') => {
                chars.next();
                state = State::Code;
            }
            State::BlockComment => {}
            State::Code => match ch {
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                ';' => terminated = true,
                c if c.is_whitespace() => {}
                _ if terminated => return true,
                '\'' | '"' => state = State::Quoted(ch),
                _ => {}
            },
        }
    }

    false
}
