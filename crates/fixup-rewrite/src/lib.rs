//! Rewrite rules for converter-generated HTML.
//!
//! # Scope
//!
//! This crate implements the stateful rewriting pass on top of the
//! `fixup-html` scanner:
//! - **`<html>`** - replaced with a canonical `<html lang="en">`
//! - **`<main>`** - synthesized around palpable body content when the
//!   document has none, and closed where it must end
//! - **`<meta name="generator">`** - `,fixuphtml` appended to the content
//! - **`<nav id="TOC">`** - given a `title="Table Of Contents"`
//! - **Simple tables** - the column with the most distinct cell contents
//!   promoted to `<th scope="row">` row headers
//!
//! Everything not touched by a rule is reproduced byte for byte.

/// The event consumer and pipeline driver.
pub mod engine;
mod style;
mod table;

pub use engine::{Engine, rewrite};
