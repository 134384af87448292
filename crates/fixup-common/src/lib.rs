//! Common utilities for the fixuphtml tool.
//!
//! This crate provides the shared infrastructure used by the scanner and
//! rewrite components:
//! - **Diagnostics** - problem reports tied to an input line, delivered
//!   through a [`Reporter`] so the pipeline stays free of global state

pub mod diag;

pub use diag::{Diagnostic, MemoryReporter, Reporter};
