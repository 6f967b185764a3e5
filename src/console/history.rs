//! Input history with cursor-relative recall
//!
//! The cursor ranges over `0..=len`. `len` is the past-the-end position and
//! stands for an empty input line.

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted line. Blank lines are not recorded.
    ///
    /// Returns whether the line was added.
    pub fn submit(&mut self, line: &str) -> bool {
        if line.trim().is_empty() {
            return false;
        }
        self.entries.push(line.to_string());
        self.cursor = self.entries.len();
        true
    }

    /// Step back one entry, stopping at the oldest.
    ///
    /// Returns `None` when there is no history.
    pub fn recall_previous(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        self.cursor = self.cursor.saturating_sub(1);
        Some(&self.entries[self.cursor])
    }

    /// Step forward one entry. Past the newest entry this yields `""`.
    ///
    /// Returns `None` when there is no history.
    pub fn recall_next(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1).min(self.entries.len());
        Some(self.entries.get(self.cursor).map_or("", String::as_str))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
