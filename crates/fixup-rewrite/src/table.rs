//! Buffered storage for one `<table>` subtree.
//!
//! The entire table is held in memory until its closing tag, at which
//! point the primary column is chosen and the buffered fragments are
//! written out with that column's `<td>` cells promoted to
//! `<th scope="row">`.
//!
//! Only "simple" tables are modified. A table is disqualified - once,
//! permanently - by a nested table, or by any cell carrying `rowspan`,
//! `colspan`, or a pre-existing `scope`. A disqualified table is still
//! buffered (its fragments ride along with the enclosing table's) but is
//! written back verbatim.

use std::collections::HashSet;
use std::io::{self, Write};

use fixup_html::Attributes;

use crate::style;

/// The kind of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellKind {
    /// A data cell; candidate for promotion.
    Td,
    /// A header cell; contributes to the name-column hint.
    Th,
}

/// One buffered HTML fragment, tagged with the cell column when it is the
/// opening tag of a `<td>` (the signal used later to know which fragments
/// are promotion candidates).
struct Entry {
    html: String,
    /// Column index and parsed attributes of the `<td>` this fragment
    /// opens; `None` for every other fragment.
    cell: Option<(usize, Attributes)>,
}

/// The cell currently being read.
struct Cell {
    kind: CellKind,
    column: usize,
    text: String,
}

/// State for the innermost buffered table and everything nested in it.
pub(crate) struct Table {
    /// False once the table is known not to be rewritable.
    pub(crate) simple: bool,
    /// Depth of `<table>` nesting; the buffer is finalized when the depth
    /// returns to zero.
    pub(crate) nest_depth: usize,
    entries: Vec<Entry>,
    /// Distinct trimmed cell contents per column; only the cardinality is
    /// ever read.
    column_contents: Vec<HashSet<String>>,
    next_column: usize,
    cell: Option<Cell>,
    /// Set when the next recorded fragment is the opening tag of a `<td>`.
    pending_td: Option<(usize, Attributes)>,
    /// Column whose header text begins with "name", if any; preferred on
    /// a distinct-count tie. The last qualifying header wins.
    name_column: Option<usize>,
}

impl Table {
    pub(crate) fn new() -> Self {
        Self {
            simple: true,
            nest_depth: 0,
            entries: Vec::new(),
            column_contents: Vec::new(),
            next_column: 0,
            cell: None,
            pending_td: None,
            name_column: None,
        }
    }

    /// Start a cell of the given kind at the next column, closing any
    /// cell still open (a new cell implicitly ends the previous one).
    pub(crate) fn start_cell(&mut self, kind: CellKind, attrs: Attributes) {
        self.end_cell();
        let column = self.next_column;
        self.next_column += 1;
        if kind == CellKind::Td {
            self.pending_td = Some((column, attrs));
        }
        self.cell = Some(Cell {
            kind,
            column,
            text: String::new(),
        });
    }

    /// Start a row: end the current cell and reset the column counter.
    pub(crate) fn start_row(&mut self) {
        self.end_cell();
        self.next_column = 0;
    }

    /// Close the current cell, if any: record its trimmed text in the
    /// column's distinct set and note the name-column hint for a header
    /// whose text begins with "name".
    pub(crate) fn end_cell(&mut self) {
        if let Some(cell) = self.cell.take() {
            let text = cell.text.trim().to_string();
            if cell.kind == CellKind::Th && text.to_ascii_lowercase().starts_with("name") {
                self.name_column = Some(cell.column);
            }
            let _ = self.column(cell.column).insert(text);
        }
    }

    /// Append text to the current cell's content, if a cell is open.
    pub(crate) fn content(&mut self, text: &str) {
        if let Some(cell) = &mut self.cell {
            cell.text.push_str(text);
        }
    }

    /// Record one raw fragment. Tagged as a `<td>` opener exactly when a
    /// cell start is pending from [`Table::start_cell`].
    pub(crate) fn add(&mut self, html: String) {
        let cell = self.pending_td.take();
        self.entries.push(Entry { html, cell });
    }

    /// Write the buffered table out, promoting the primary column's
    /// `<td>` cells if the table is simple.
    ///
    /// A promoted opening tag is rebuilt as `<th>` with its attributes in
    /// the original order, the merged `style`, and `scope="row"` appended.
    /// The matching `</td>` becomes `</th>`; if another cell opens before
    /// the close is seen (an implicitly closed cell) the pending close
    /// rewrite is abandoned silently.
    pub(crate) fn write<W: Write>(self, out: &mut W) -> io::Result<()> {
        let target = self.primary_column();
        let mut update_end_td = false;
        for entry in &self.entries {
            let promote = self.simple
                && entry
                    .cell
                    .as_ref()
                    .is_some_and(|(column, _)| Some(*column) == target);
            if promote {
                if let Some((_, attrs)) = &entry.cell {
                    out.write_all(promote_cell(attrs).as_bytes())?;
                }
                update_end_td = true;
            } else if update_end_td && entry.html.eq_ignore_ascii_case("</td>") {
                out.write_all(b"</th>")?;
                update_end_td = false;
            } else {
                out.write_all(entry.html.as_bytes())?;
                if update_end_td && entry.cell.is_some() {
                    update_end_td = false;
                }
            }
        }
        Ok(())
    }

    /// Write the buffered fragments out untouched. Used when the input
    /// ends with the table still open.
    pub(crate) fn write_verbatim<W: Write>(self, out: &mut W) -> io::Result<()> {
        for entry in &self.entries {
            out.write_all(entry.html.as_bytes())?;
        }
        Ok(())
    }

    /// The column with the strictly largest number of distinct entries.
    /// On a tie, the name-column hint wins if it is among the tied
    /// columns; otherwise the earliest tied index stands.
    fn primary_column(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (index, contents) in self.column_contents.iter().enumerate() {
            let count = contents.len();
            match best {
                None => best = Some((index, count)),
                Some((_, max)) if count > max => best = Some((index, count)),
                Some((_, max)) if count == max && Some(index) == self.name_column => {
                    best = Some((index, count));
                }
                Some(_) => {}
            }
        }
        best.map(|(index, _)| index)
    }

    fn column(&mut self, index: usize) -> &mut HashSet<String> {
        while self.column_contents.len() <= index {
            self.column_contents.push(HashSet::new());
        }
        &mut self.column_contents[index]
    }
}

/// Rebuild a `<td ...>` opening tag as a `<th ...>` row header.
///
/// The merged `style` replaces an existing one in place; a cell with no
/// `style` gets one first, ahead of its other attributes.
fn promote_cell(attrs: &Attributes) -> String {
    let merged = style::merge(attrs.get("style"));
    let mut tag = String::from("<th");
    if attrs.contains("style") {
        for attr in attrs {
            if attr.name == "style" {
                tag.push_str(&format!(" style=\"{merged}\""));
            } else {
                tag.push_str(&attr.to_string());
            }
        }
    } else {
        tag.push_str(&format!(" style=\"{merged}\""));
        for attr in attrs {
            tag.push_str(&attr.to_string());
        }
    }
    tag.push_str(" scope=\"row\">");
    tag
}
