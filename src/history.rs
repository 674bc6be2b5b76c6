//! Command history.
//!
//! An in-memory store owned by the caller. Nothing here is global and
//! nothing is written to disk.

use std::collections::VecDeque;

const MAX_HISTORY_SIZE: usize = 100;

/// Previously entered commands, newest first.
#[derive(Debug, Default, Clone)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    /// Index of the entry last returned by navigation (None = not navigating).
    cursor: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a command.
    ///
    /// Input is trimmed and blank input ignored. Re-entering a command moves
    /// it to the front instead of storing it twice.
    pub fn push(&mut self, command: &str) {
        let command = command.trim();
        if command.is_empty() {
            return;
        }

        if let Some(pos) = self.entries.iter().position(|e| e == command) {
            self.entries.remove(pos);
        }
        self.entries.push_front(command.to_string());
        self.entries.truncate(MAX_HISTORY_SIZE);

        self.cursor = None;
    }

    /// Steps to the next older command. Once the oldest command is reached
    /// it keeps returning that one. `None` only when the history is empty.
    pub fn previous(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let pos = match self.cursor {
            None => 0,
            Some(pos) => (pos + 1).min(self.entries.len() - 1),
        };
        self.cursor = Some(pos);
        self.entries.get(pos).map(String::as_str)
    }

    /// Steps to the next newer command. Stepping past the newest returns an
    /// empty string, clearing the input line; `None` when not navigating.
    pub fn next(&mut self) -> Option<&str> {
        match self.cursor {
            None => None,
            Some(0) => {
                self.cursor = None;
                Some("")
            }
            Some(pos) => {
                self.cursor = Some(pos - 1);
                self.entries.get(pos - 1).map(String::as_str)
            }
        }
    }

    /// Stops navigating without touching the stored commands.
    pub fn reset_position(&mut self) {
        self.cursor = None;
    }

    /// Up to `count` commands, newest first. A count of zero means all.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &str> + '_ {
        let count = if count == 0 { self.entries.len() } else { count };
        self.entries.iter().take(count).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
