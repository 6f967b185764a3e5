// Console transcript and parsed stack snapshots

use crate::memory::Cell;

/// Where a transcript line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// An echoed input line
    Input,
    /// Text written by the module
    Output,
    /// Messages from the console itself
    Notice,
}

/// A line of transcript text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub text: String,
    pub kind: LineKind,
}

/// Scrollback of everything echoed and printed in a session.
///
/// Module output does not always end in a newline, so the last line stays
/// open and later output of the same kind continues it.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub lines: Vec<TranscriptLine>,
    open: bool,
    max_lines: usize,
}

/// Lines kept before the oldest are dropped
pub const DEFAULT_MAX_LINES: usize = 5000;

impl Transcript {
    pub fn new() -> Self {
        Self::with_max_lines(DEFAULT_MAX_LINES)
    }

    pub fn with_max_lines(max_lines: usize) -> Self {
        Transcript {
            lines: Vec::new(),
            open: false,
            max_lines: max_lines.max(1),
        }
    }

    /// Append `text`, splitting on newlines
    pub fn print(&mut self, text: &str, kind: LineKind) {
        if text.is_empty() {
            return;
        }

        let mut parts = text.split('\n').peekable();
        while let Some(part) = parts.next() {
            let last_part = parts.peek().is_none();
            let continues = self.open && self.lines.last().is_some_and(|line| line.kind == kind);
            if continues {
                if let Some(line) = self.lines.last_mut() {
                    line.text.push_str(part);
                }
            } else if !(last_part && part.is_empty()) {
                self.lines.push(TranscriptLine {
                    text: part.to_string(),
                    kind,
                });
            }
            // Only a trailing fragment without newline stays open
            self.open = last_part && !part.is_empty();
        }
        self.trim();
    }

    /// Echo a submitted line as its own input line
    pub fn echo_input(&mut self, line: &str) {
        self.open = false;
        self.print(&format!("{}\n", line), LineKind::Input);
    }

    pub fn notice(&mut self, text: &str) {
        self.open = false;
        self.print(&format!("{}\n", text), LineKind::Notice);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.open = false;
    }

    /// All lines as plain strings
    pub fn get_output(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.text.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn trim(&mut self) {
        if self.lines.len() > self.max_lines {
            let excess = self.lines.len() - self.max_lines;
            self.lines.drain(..excess);
        }
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

/// A stack dump parsed back into numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSnapshot {
    /// Full stack depth reported by the module
    pub depth: usize,
    /// Cells shown, top of stack first
    pub cells: Vec<Cell>,
}

impl StackSnapshot {
    /// Parse dump text of the form `n = <depth>` followed by one `0x<hex>`
    /// per line. Returns `None` if the header is missing.
    ///
    /// A cell cut short by truncation is still parsed from the digits present.
    pub fn parse(text: &str) -> Option<Self> {
        let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
        let depth = lines.next()?.strip_prefix("n = ")?.parse().ok()?;
        let cells = lines
            .filter_map(|line| line.strip_prefix("0x"))
            .filter_map(|digits| u32::from_str_radix(digits, 16).ok())
            .map(|value| value as Cell)
            .collect();
        Some(StackSnapshot { depth, cells })
    }

    /// Top of stack, if shown
    pub fn top(&self) -> Option<Cell> {
        self.cells.first().copied()
    }

    pub fn is_truncated(&self) -> bool {
        self.cells.len() < self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_output_continues_line() {
        let mut transcript = Transcript::new();
        transcript.print("1 ", LineKind::Output);
        transcript.print("2 ", LineKind::Output);
        transcript.print("3\n", LineKind::Output);
        transcript.print("done\n", LineKind::Output);
        assert_eq!(transcript.get_output(), vec!["1 2 3", "done"]);
    }

    #[test]
    fn test_input_always_starts_a_new_line() {
        let mut transcript = Transcript::new();
        transcript.print("ok", LineKind::Output);
        transcript.echo_input("2 3 +");
        transcript.print("5 ", LineKind::Output);
        assert_eq!(transcript.get_output(), vec!["ok", "2 3 +", "5 "]);
        assert_eq!(transcript.lines[1].kind, LineKind::Input);
        assert_eq!(transcript.lines[2].kind, LineKind::Output);
    }

    #[test]
    fn test_blank_lines_inside_output_are_kept() {
        let mut transcript = Transcript::new();
        transcript.print("a\n\nb\n", LineKind::Output);
        assert_eq!(transcript.get_output(), vec!["a", "", "b"]);
    }

    #[test]
    fn test_oldest_lines_are_dropped() {
        let mut transcript = Transcript::with_max_lines(2);
        for line in ["one", "two", "three"] {
            transcript.notice(line);
        }
        assert_eq!(transcript.get_output(), vec!["two", "three"]);
    }

    #[test]
    fn test_clear_empties_transcript() {
        let mut transcript = Transcript::new();
        transcript.print("partial", LineKind::Output);
        transcript.clear();
        transcript.print("fresh", LineKind::Output);
        assert_eq!(transcript.get_output(), vec!["fresh"]);
    }

    #[test]
    fn test_parse_stack_snapshot() {
        let snapshot = StackSnapshot::parse("n = 3\n0xff\n0xffffffff\n0x1").unwrap();
        assert_eq!(snapshot.depth, 3);
        assert_eq!(snapshot.cells, vec![255, -1, 1]);
        assert_eq!(snapshot.top(), Some(255));
        assert!(!snapshot.is_truncated());

        let empty = StackSnapshot::parse("n = 0").unwrap();
        assert_eq!(empty.top(), None);
        assert!(StackSnapshot::parse("garbage").is_none());
    }
}
