//! The scanner state machine.
//!
//! One construct is recognized per `<`, selected by the character after
//! it: an identifier starts an opening tag, `/` a closing tag, `!` a
//! comment, CDATA section, or doctype, and `?` an `<?xml ...?>`
//! declaration. Anything else is signaled as "bad html" and scanning
//! continues; the offending text is carried through in the raw text of a
//! later event, so even malformed input round-trips.

use std::io::{self, BufRead};
use std::mem;

use thiserror::Error;

use super::attrs::{Attributes, decode_entities};
use super::event::{Event, EventKind, Tag};
use super::source::CharSource;

/// A problem encountered while scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Markup that matches no recognized construct.
    ///
    /// This error is recoverable: the scanner has consumed at least the
    /// `<` that opened the construct, so the caller can report the
    /// problem and keep pulling events.
    #[error("bad html")]
    BadHtml {
        /// 1-based line on which the problem was detected.
        line: u32,
    },
    /// The underlying stream failed. Not recoverable.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Single-pass scanner over a character stream.
///
/// Pull events with [`Scanner::next_event`] until it returns `Ok(None)`.
/// The scanner holds exactly one character of lookahead and never
/// backtracks; everything it consumes is accumulated verbatim and handed
/// out as the `raw` text of the events it emits.
pub struct Scanner<R> {
    source: CharSource<R>,
    /// One character of lookahead; `None` at end of input.
    current: Option<char>,
    started: bool,
    /// Verbatim input consumed since the last emitted event.
    pending: String,
    /// Text accumulated for the next content event.
    run: String,
    /// Inside `<script>`: no construct is recognized except the literal
    /// closing `</script>`.
    in_script: bool,
    /// Seen `<?xml ...?>`: accept `:` in attribute names.
    xml: bool,
}

impl<R: BufRead> Scanner<R> {
    /// Create a scanner over `input`. No input is read until the first
    /// call to [`Scanner::next_event`].
    pub fn new(input: R) -> Self {
        Self {
            source: CharSource::new(input),
            current: None,
            started: false,
            pending: String::new(),
            run: String::new(),
            in_script: false,
            xml: false,
        }
    }

    /// The current 1-based line number.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.source.line()
    }

    /// Produce the next event, or `Ok(None)` at end of input.
    ///
    /// Text runs are flushed as content events at each newline, before
    /// each `<`, and at end of input, preserving the original text
    /// exactly.
    ///
    /// # Errors
    ///
    /// [`ScanError::BadHtml`] for markup that matches no construct; the
    /// caller may keep pulling events afterwards. [`ScanError::Io`] for
    /// stream failures, which end the run.
    pub fn next_event(&mut self) -> Result<Option<Event>, ScanError> {
        if !self.started {
            self.started = true;
            self.advance()?;
        }
        loop {
            match self.current {
                None => {
                    if self.run.is_empty() && self.pending.is_empty() {
                        return Ok(None);
                    }
                    return Ok(Some(self.content_event()));
                }
                Some('<') => {
                    // Flush any text (or eventless raw input such as a
                    // CDATA section) so a tag event's raw text is exactly
                    // the tag itself.
                    if !self.run.is_empty() || !self.pending.is_empty() {
                        return Ok(Some(self.content_event()));
                    }
                    if self.in_script {
                        if let Some(event) = self.scan_script_close()? {
                            return Ok(Some(event));
                        }
                        // Not the closing tag: the consumed characters
                        // were script text; keep scanning.
                    } else if let Some(event) = self.scan_markup()? {
                        return Ok(Some(event));
                    }
                }
                Some(c) => {
                    self.run.push(c);
                    self.advance()?;
                    if c == '\n' {
                        return Ok(Some(self.content_event()));
                    }
                }
            }
        }
    }

    /// Consume the current character into the pending raw text and load
    /// the next one.
    fn advance(&mut self) -> io::Result<()> {
        if let Some(c) = self.current {
            self.pending.push(c);
        }
        self.current = self.source.next()?;
        Ok(())
    }

    fn content_event(&mut self) -> Event {
        let line = self.line();
        let text = mem::take(&mut self.run);
        let raw = mem::take(&mut self.pending);
        Event {
            kind: EventKind::Content(text),
            raw,
            line,
        }
    }

    fn bad_html(&self) -> ScanError {
        ScanError::BadHtml { line: self.line() }
    }

    /// Scan one construct starting at `<`.
    ///
    /// Returns `Ok(None)` for constructs that are consumed without an
    /// event (CDATA, `<?xml ...?>`); their raw text stays pending and is
    /// carried by the next event.
    fn scan_markup(&mut self) -> Result<Option<Event>, ScanError> {
        let line = self.line();
        self.advance()?; // '<'
        match self.current {
            Some(c) if is_identifier_start(c) => self.scan_start_tag(line).map(Some),
            Some('/') => self.scan_end_tag(line).map(Some),
            Some('!') => self.scan_declaration(line),
            Some('?') => self.scan_xml_declaration().map(|()| None),
            _ => Err(self.bad_html()),
        }
    }

    /// `<identifier attrs...>` - an opening tag, optionally self-closing.
    fn scan_start_tag(&mut self, line: u32) -> Result<Event, ScanError> {
        let name = self.read_identifier()?;
        let attrs = self.scan_attributes()?;
        let mut self_closing = false;
        if self.current == Some('/') {
            self.advance()?;
            self_closing = true;
        }
        if self.current != Some('>') {
            return Err(self.bad_html());
        }
        self.advance()?;
        if name == "script" && !self_closing {
            self.in_script = true;
        }
        Ok(Event {
            kind: EventKind::Start(Tag {
                name,
                attrs,
                self_closing,
            }),
            raw: mem::take(&mut self.pending),
            line,
        })
    }

    /// `</identifier >` - a closing tag.
    fn scan_end_tag(&mut self, line: u32) -> Result<Event, ScanError> {
        self.advance()?; // '/'
        if !self.current.is_some_and(is_identifier_start) {
            return Err(self.bad_html());
        }
        let name = self.read_identifier()?;
        self.skip_whitespace()?;
        if self.current != Some('>') {
            return Err(self.bad_html());
        }
        self.advance()?;
        if name == "script" {
            self.in_script = false;
        }
        Ok(Event {
            kind: EventKind::End(name),
            raw: mem::take(&mut self.pending),
            line,
        })
    }

    /// `<!` - a comment, a CDATA section, or a doctype declaration.
    fn scan_declaration(&mut self, line: u32) -> Result<Option<Event>, ScanError> {
        self.advance()?; // '!'
        match self.current {
            Some('-') => {
                self.advance()?;
                if self.current != Some('-') {
                    return Err(self.bad_html());
                }
                self.advance()?;
                self.scan_comment(line).map(Some)
            }
            Some('[') => {
                self.scan_cdata()?;
                Ok(None)
            }
            _ => self.scan_doctype(line),
        }
    }

    /// The interior of `<!-- ... -->`, after the opening dashes.
    ///
    /// A comment is only closed by `>` preceded by at least two `-`
    /// characters, so embedded dashes and runs like `---->` are handled;
    /// exactly two closing dashes are stripped from the emitted text.
    fn scan_comment(&mut self, line: u32) -> Result<Event, ScanError> {
        let mut text = String::new();
        loop {
            let mut dashes = 0;
            while self.current == Some('-') {
                dashes += 1;
                text.push('-');
                self.advance()?;
            }
            if dashes >= 2 && self.current == Some('>') {
                self.advance()?;
                text.truncate(text.len() - 2);
                return Ok(Event {
                    kind: EventKind::Comment(text),
                    raw: mem::take(&mut self.pending),
                    line,
                });
            }
            match self.current {
                Some(c) => {
                    text.push(c);
                    self.advance()?;
                }
                None => return Err(self.bad_html()),
            }
        }
    }

    /// `<![CDATA[ ... ]]>` - consumed and discarded; no event.
    ///
    /// The section's text stays in the pending raw input, so it is still
    /// written through unchanged.
    fn scan_cdata(&mut self) -> Result<(), ScanError> {
        self.advance()?; // '['
        for expected in ['C', 'D', 'A', 'T', 'A', '['] {
            if self.current != Some(expected) {
                return Err(self.bad_html());
            }
            self.advance()?;
        }
        loop {
            let mut brackets = 0;
            while self.current == Some(']') {
                brackets += 1;
                self.advance()?;
            }
            if brackets >= 2 && self.current == Some('>') {
                self.advance()?;
                return Ok(());
            }
            match self.current {
                Some(_) => self.advance()?,
                None => return Err(self.bad_html()),
            }
        }
    }

    /// `<!doctype html ...>` - anything else after `<!` is "bad html".
    fn scan_doctype(&mut self, line: u32) -> Result<Option<Event>, ScanError> {
        let mut text = String::new();
        while let Some(c) = self.current {
            if c == '>' {
                break;
            }
            text.push(c);
            self.advance()?;
        }
        if !is_doctype(&text) {
            return Err(self.bad_html());
        }
        if self.current == Some('>') {
            self.advance()?;
        }
        Ok(Some(Event {
            kind: EventKind::Doctype(text),
            raw: mem::take(&mut self.pending),
            line,
        }))
    }

    /// `<?xml ...?>` - consumed without an event; puts the scanner in
    /// XML mode, which admits `:` in attribute names.
    fn scan_xml_declaration(&mut self) -> Result<(), ScanError> {
        self.advance()?; // '?'
        for expected in ['x', 'm', 'l'] {
            if self.current != Some(expected) {
                return Err(self.bad_html());
            }
            self.advance()?;
        }
        let _attrs = self.scan_attributes()?;
        if self.current != Some('?') {
            return Err(self.bad_html());
        }
        self.advance()?;
        if self.current != Some('>') {
            return Err(self.bad_html());
        }
        self.advance()?;
        self.xml = true;
        Ok(())
    }

    /// Inside a script, test whether `<` starts the literal closing
    /// `</script>`. If it does not, the characters consumed while looking
    /// are replayed into the current text run and `Ok(None)` is returned.
    fn scan_script_close(&mut self) -> Result<Option<Event>, ScanError> {
        let line = self.line();
        let mark = self.pending.len();
        self.advance()?; // '<'
        if self.current == Some('/') {
            self.advance()?;
            if self.current.is_some_and(is_identifier_start) {
                let name = self.read_identifier()?;
                if name == "script" {
                    self.skip_whitespace()?;
                    if self.current == Some('>') {
                        self.advance()?;
                        self.in_script = false;
                        return Ok(Some(Event {
                            kind: EventKind::End(name),
                            raw: mem::take(&mut self.pending),
                            line,
                        }));
                    }
                }
            }
        }
        let looked_at = self.pending[mark..].to_string();
        self.run.push_str(&looked_at);
        Ok(None)
    }

    /// Read an identifier starting at the current character, folding it
    /// to ASCII lowercase. The caller has verified the first character.
    fn read_identifier(&mut self) -> Result<String, ScanError> {
        let mut name = String::new();
        if let Some(c) = self.current {
            name.push(c.to_ascii_lowercase());
            self.advance()?;
        }
        while let Some(c) = self.current {
            if !is_identifier_part(c) {
                break;
            }
            name.push(c.to_ascii_lowercase());
            self.advance()?;
        }
        Ok(name)
    }

    /// Read an attribute name. Beyond identifier characters this accepts
    /// `-` anywhere, and `:` when the document is XML-flavored or the
    /// name so far begins with `xml` (`xmlns:...`, `xml:lang`).
    fn read_attribute_name(&mut self) -> Result<String, ScanError> {
        let mut name = String::new();
        if let Some(c) = self.current {
            name.push(c.to_ascii_lowercase());
            self.advance()?;
        }
        while let Some(c) = self.current {
            let accepted = is_identifier_part(c)
                || c == '-'
                || (c == ':' && (self.xml || name.starts_with("xml")));
            if !accepted {
                break;
            }
            name.push(c.to_ascii_lowercase());
            self.advance()?;
        }
        Ok(name)
    }

    /// Read `identifier[=value]` attributes up to (not including) the
    /// tag's terminating `/` or `>`.
    ///
    /// Quoted values have `&lt;`/`&gt;`/`&amp;` decoded; unquoted values
    /// run to the next terminator character.
    fn scan_attributes(&mut self) -> Result<Attributes, ScanError> {
        let mut attrs = Attributes::new();
        self.skip_whitespace()?;
        while self.current.is_some_and(is_identifier_start) {
            let name = self.read_attribute_name()?;
            self.skip_whitespace()?;
            let mut value = None;
            if self.current == Some('=') {
                self.advance()?;
                self.skip_whitespace()?;
                value = Some(match self.current {
                    Some(quote @ ('"' | '\'')) => {
                        self.advance()?;
                        let mut text = String::new();
                        while let Some(c) = self.current {
                            if c == quote {
                                break;
                            }
                            text.push(c);
                            self.advance()?;
                        }
                        self.advance()?; // closing quote, if any
                        decode_entities(&text)
                    }
                    _ => {
                        let mut text = String::new();
                        while let Some(c) = self.current {
                            if is_unquoted_value_terminator(c) {
                                break;
                            }
                            text.push(c);
                            self.advance()?;
                        }
                        text
                    }
                });
                self.skip_whitespace()?;
            }
            attrs.insert(name, value);
        }
        Ok(attrs)
    }

    fn skip_whitespace(&mut self) -> Result<(), ScanError> {
        while self.current.is_some_and(char::is_whitespace) {
            self.advance()?;
        }
        Ok(())
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

const fn is_unquoted_value_terminator(c: char) -> bool {
    matches!(
        c,
        '\u{0C}' | '\n' | '\r' | '\t' | ' ' | '"' | '\'' | '`' | '=' | '<' | '>'
    )
}

/// Case-insensitive `doctype`, at least one whitespace character, then
/// `html`; anything may follow.
fn is_doctype(text: &str) -> bool {
    let Some(rest) = strip_prefix_ignore_case(text, "doctype") else {
        return false;
    };
    let after_space = rest.trim_start();
    if after_space.len() == rest.len() {
        return false;
    }
    strip_prefix_ignore_case(after_space, "html").is_some()
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}
