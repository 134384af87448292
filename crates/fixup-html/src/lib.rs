//! Streaming HTML scanner for the fixuphtml tool.
//!
//! # Scope
//!
//! This crate implements:
//! - **Character Source** - one `char` at a time from any [`std::io::BufRead`],
//!   with 1-based line tracking for diagnostics
//! - **Scanner** - a single-pass, no-backtracking tokenizer that recognizes
//!   start/end tags (with attributes), comments, doctypes, CDATA sections,
//!   and `<?xml ...?>` declarations, and emits structural [`Event`]s paired
//!   with the verbatim input text that produced them
//!
//! # Not Implemented
//!
//! This is not an HTML5 tokenizer. There is no character-reference
//! resolution beyond `&lt;`/`&gt;`/`&amp;` in quoted attribute values, no
//! tree construction, and no error recovery beyond a per-construct
//! "bad html" signal. Script elements are copied through as raw text.

/// Incremental scanner producing structural events.
pub mod scanner;

pub use scanner::{Attribute, Attributes, CharSource, Event, EventKind, ScanError, Scanner, Tag};
