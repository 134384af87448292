//! Incremental HTML scanning.
//!
//! The scanner is pull-based: each call to [`Scanner::next_event`] consumes
//! just enough input to produce the next structural [`Event`]. Every event
//! carries the raw text that produced it, so a consumer that writes each
//! event's raw text back out reproduces its input byte for byte.

mod attrs;
mod event;
mod source;
#[allow(clippy::module_inception)]
mod scanner;

pub use attrs::{Attribute, Attributes};
pub use event::{Event, EventKind, Tag};
pub use scanner::{ScanError, Scanner};
pub use source::CharSource;
