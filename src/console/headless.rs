//! Line-at-a-time console for piped input
//!
//! Reads lines from any [`BufRead`], evaluates each one through the
//! [`Session`] and writes what the module printed. When input ends, the
//! stack dump is written on lines of its own.

use super::session::Session;
use std::io::{self, BufRead, Write};

/// Run every line of `input` through `session`, writing output to `out`.
///
/// Lines the session refuses (allocation failure) are logged and skipped.
pub fn run<R: BufRead, W: Write>(session: &mut Session, input: R, out: &mut W) -> io::Result<()> {
    // Startup banner and prelude output
    for line in session.transcript().get_output() {
        writeln!(out, "{}", line)?;
    }

    let mut at_line_start = true;
    for line in input.lines() {
        let line = line?;
        match session.submit(&line) {
            Ok(Some(eval)) if !eval.output.is_empty() => {
                write!(out, "{}", eval.output)?;
                out.flush()?;
                at_line_start = eval.output.ends_with('\n');
            }
            Ok(_) => {}
            Err(e) => log::error!("{}", e),
        }
    }

    if !at_line_start {
        writeln!(out)?;
    }
    writeln!(out, "{}", session.stack().text())?;
    out.flush()
}
