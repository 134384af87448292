//! The rewriting event consumer and the pipeline driver.

use std::io::{self, BufRead, Write};

use fixup_common::{Diagnostic, Reporter};
use fixup_html::{Attributes, Event, EventKind, ScanError, Scanner, Tag};

use crate::table::{CellKind, Table};

/// Consumes scanner events and writes the rewritten document.
///
/// Every event's raw text is either written through unchanged or replaced
/// by the rule that fired for it; while a table is buffering, fragments
/// are routed into the table instead of the output so the table can be
/// rearranged once it is complete.
pub struct Engine<W> {
    out: W,
    /// Whether `<main>` may be inserted here. Set inside `<body>`,
    /// cleared inside the sectioning elements `<main>` is not permitted
    /// in (`article`, `aside`, `footer`, `header`, `nav`).
    allow_main: bool,
    /// Whether a `<main>` is still owed. Set at `<body>`, cleared once an
    /// explicit `<main>` is seen or a synthetic one is emitted.
    need_main: bool,
    /// Whether a synthetic `<main>` is open and must be closed.
    need_end_main: bool,
    /// The table currently being buffered, if any.
    table: Option<Table>,
}

impl<W: Write> Engine<W> {
    /// Create an engine writing to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            allow_main: false,
            need_main: false,
            need_end_main: false,
            table: None,
        }
    }

    /// Process one event.
    ///
    /// # Errors
    ///
    /// Returns any error raised while writing the output.
    pub fn handle(&mut self, event: Event) -> io::Result<()> {
        match event.kind {
            EventKind::Doctype(_) | EventKind::Comment(_) => self.emit(event.raw),
            EventKind::Start(tag) => self.start_element(tag, event.raw),
            EventKind::End(name) => self.end_element(&name, event.raw),
            EventKind::Content(text) => self.content(&text, event.raw),
        }
    }

    /// Finish the run and hand the output back.
    ///
    /// If the input ended with a table still open, its buffered fragments
    /// are written out verbatim so no input byte is lost.
    ///
    /// # Errors
    ///
    /// Returns any error raised while writing the output.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(table) = self.table.take() {
            table.write_verbatim(&mut self.out)?;
        }
        Ok(self.out)
    }

    fn start_element(&mut self, tag: Tag, raw: String) -> io::Result<()> {
        let Tag {
            name,
            attrs,
            self_closing,
        } = tag;
        let mut raw = raw;
        match name.as_str() {
            // Replace the whole opening tag, dropping any original
            // attributes (notably XML namespace declarations).
            "html" => raw = String::from("<html lang=\"en\">"),

            // Record that the document went through this tool.
            "meta" => {
                if attrs.get("name") == Some("generator")
                    && let Some(stamped) = stamp_generator(&attrs, self_closing)
                {
                    raw = stamped;
                }
            }

            // Starting one of these sections ends a synthetic <main>, and
            // <main> is not permitted inside them.
            "article" | "aside" | "footer" | "header" | "nav" => {
                if self.need_end_main {
                    self.write("</main>")?;
                    self.need_end_main = false;
                }
                self.allow_main = false;
                if name == "nav" && attrs.get("id") == Some("TOC") && !attrs.contains("title") {
                    raw = toc_nav(&attrs, self_closing);
                }
            }

            // Within <body>, <main> is both permitted and required.
            "body" => {
                self.allow_main = true;
                self.need_main = true;
            }

            // An explicit <main>: no synthetic one will be generated.
            "main" => self.need_main = false,

            "table" => {
                match &mut self.table {
                    // A nested table disqualifies the whole buffer.
                    Some(table) => table.simple = false,
                    None => self.table = Some(Table::new()),
                }
                if let Some(table) = &mut self.table {
                    table.nest_depth += 1;
                }
            }

            "thead" | "tbody" => {
                if let Some(table) = &mut self.table {
                    table.end_cell();
                }
            }

            "tr" => {
                if let Some(table) = &mut self.table {
                    table.start_row();
                }
            }

            "td" | "th" => {
                if let Some(table) = &mut self.table {
                    // Spanning cells and pre-existing scopes disqualify
                    // the table.
                    if attrs.contains("rowspan")
                        || attrs.contains("colspan")
                        || attrs.contains("scope")
                    {
                        table.simple = false;
                    }
                    let kind = if name == "td" { CellKind::Td } else { CellKind::Th };
                    table.start_cell(kind, attrs);
                }
            }

            _ => {}
        }

        // By default an element is palpable content: insert <main> if it
        // is permitted and one is still owed, but never before <body>
        // itself.
        if self.allow_main && self.need_main && name != "body" {
            self.write("<main>")?;
            self.need_main = false;
            self.need_end_main = true;
        }

        self.emit(raw)
    }

    fn end_element(&mut self, name: &str, raw: String) -> io::Result<()> {
        match name {
            // Nesting of these sections is not tracked: closing a nested
            // one re-allows <main> insertion even though an outer section
            // may still be open. Known limitation.
            "article" | "aside" | "footer" | "header" | "nav" => self.allow_main = true,

            "body" => {
                if self.need_end_main {
                    self.write("</main>")?;
                    self.need_end_main = false;
                }
            }

            "table" => {
                let finished = self.table.as_mut().is_some_and(|table| {
                    table.nest_depth -= 1;
                    table.nest_depth == 0
                });
                if finished && let Some(mut table) = self.table.take() {
                    // The closing tag itself belongs to the buffer; then
                    // the whole table can be analyzed and written.
                    table.add(raw);
                    return table.write(&mut self.out);
                }
            }

            // Ending any of these implicitly or explicitly ends the
            // current cell.
            "thead" | "tbody" | "tr" | "td" | "th" => {
                if let Some(table) = &mut self.table {
                    table.end_cell();
                }
            }

            _ => {}
        }
        self.emit(raw)
    }

    fn content(&mut self, text: &str, raw: String) -> io::Result<()> {
        if let Some(table) = &mut self.table {
            table.content(text);
        } else if self.allow_main && self.need_main && !text.trim().is_empty() {
            // Palpable content: the owed <main> goes in front of it.
            self.write("<main>")?;
            self.need_main = false;
            self.need_end_main = true;
        }
        self.emit(raw)
    }

    /// Route a fragment to the buffered table if one is open, otherwise
    /// to the output.
    fn emit(&mut self, raw: String) -> io::Result<()> {
        if let Some(table) = &mut self.table {
            table.add(raw);
            Ok(())
        } else {
            self.out.write_all(raw.as_bytes())
        }
    }

    /// Write directly to the output, bypassing any table buffer. Used for
    /// synthetic `<main>`/`</main>` tags, which belong outside the table.
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }
}

/// Rebuild a generator `<meta>` with `,fixuphtml` appended to its content
/// value. Returns `None` when there is no content value to stamp, or when
/// the value is already stamped (so a rerun is a no-op).
fn stamp_generator(attrs: &Attributes, self_closing: bool) -> Option<String> {
    let content = attrs.get("content")?;
    if content.ends_with(",fixuphtml") {
        return None;
    }
    let mut attrs = attrs.clone();
    attrs.insert("content", Some(format!("{content},fixuphtml")));
    Some(render_tag("meta", &attrs, self_closing))
}

/// Rebuild the table-of-contents `<nav>` with its title attribute.
fn toc_nav(attrs: &Attributes, self_closing: bool) -> String {
    let mut attrs = attrs.clone();
    attrs.insert("title", Some(String::from("Table Of Contents")));
    render_tag("nav", &attrs, self_closing)
}

fn render_tag(name: &str, attrs: &Attributes, self_closing: bool) -> String {
    let close = if self_closing { " />" } else { ">" };
    format!("<{name}{attrs}{close}")
}

/// Run the whole pipeline: scan `input`, rewrite, write to `out`.
///
/// "bad html" signals are delivered to `reporter` with their line number
/// and scanning continues; the output is returned once the input is
/// exhausted so the caller can flush it.
///
/// # Errors
///
/// Returns the first I/O error raised by the input or output stream.
pub fn rewrite<R, W, P>(input: R, out: W, reporter: &mut P) -> io::Result<W>
where
    R: BufRead,
    W: Write,
    P: Reporter,
{
    let mut scanner = Scanner::new(input);
    let mut engine = Engine::new(out);
    loop {
        match scanner.next_event() {
            Ok(Some(event)) => engine.handle(event)?,
            Ok(None) => break,
            Err(ScanError::BadHtml { line }) => {
                reporter.report(Diagnostic::at(line, "bad html"));
            }
            Err(ScanError::Io(source)) => return Err(source),
        }
    }
    engine.finish()
}
