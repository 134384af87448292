//! Problem reports for a single rewriting run.
//!
//! The scanner signals recoverable problems ("bad html") without stopping,
//! so diagnostics flow through a [`Reporter`] owned by the caller rather
//! than being printed from library code. The CLI prints them to stderr in
//! `FILE:LINE: MESSAGE` form; tests collect them with [`MemoryReporter`].

use core::fmt;

/// A single reported problem.
///
/// The file label is not part of the diagnostic: the reporter knows which
/// stream it is attached to and adds the label when formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based input line, or `None` for problems not tied to a specific
    /// line (stream open failures, for example).
    pub line: Option<u32>,
    /// Description of the problem.
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic tied to an input line.
    #[must_use]
    pub fn at(line: u32, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    /// Create a diagnostic with no associated input line.
    #[must_use]
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{line}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Sink for diagnostics produced during a run.
///
/// Reporting never fails and never stops the run; the implementation
/// decides what reporting means (stderr, a buffer, ...).
pub trait Reporter {
    /// Deliver one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

/// A [`Reporter`] that collects diagnostics in memory.
///
/// Used by tests to assert on the exact problems a run produced.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    /// Every diagnostic reported so far, in order.
    pub diagnostics: Vec<Diagnostic>,
}

impl Reporter for MemoryReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
