//! Character-at-a-time input with line tracking.

use std::io::{self, BufRead};

/// Reads a stream one `char` at a time, tracking 1-based line numbers.
///
/// Input is pulled line-wise through [`BufRead::read_line`], so memory use
/// is bounded by the longest input line and invalid UTF-8 surfaces as an
/// [`io::ErrorKind::InvalidData`] error from the underlying read.
///
/// The source itself has no lookahead; the scanner holds exactly one
/// character of lookahead as its own state.
pub struct CharSource<R> {
    input: R,
    line_buf: String,
    pos: usize,
    line: u32,
}

impl<R: BufRead> CharSource<R> {
    /// Create a source positioned at line 1 of `input`.
    pub fn new(input: R) -> Self {
        Self {
            input,
            line_buf: String::new(),
            pos: 0,
            line: 1,
        }
    }

    /// The current 1-based line number.
    ///
    /// The counter advances when a newline is read, so a character returned
    /// after a `'\n'` is reported on the following line.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Return the next character, or `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the underlying reader, including
    /// [`io::ErrorKind::InvalidData`] for input that is not valid UTF-8.
    pub fn next(&mut self) -> io::Result<Option<char>> {
        if self.pos >= self.line_buf.len() {
            self.line_buf.clear();
            self.pos = 0;
            if self.input.read_line(&mut self.line_buf)? == 0 {
                return Ok(None);
            }
        }
        match self.line_buf[self.pos..].chars().next() {
            Some(c) => {
                self.pos += c.len_utf8();
                if c == '\n' {
                    self.line += 1;
                }
                Ok(Some(c))
            }
            // Unreachable: pos < len means at least one char remains.
            None => Ok(None),
        }
    }
}
