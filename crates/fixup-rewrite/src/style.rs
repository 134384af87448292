//! Style-declaration merging for promoted header cells.
//!
//! A promoted cell gets `font-weight: normal` prefixed and
//! `text-align: left` added unless the cell already sets `text-align`.
//! The merge works on parsed `property: value` declarations, deduplicated
//! by property name with first-seen order preserved, rather than on the
//! raw attribute text.

/// Merge the header-cell defaults into an existing `style` value.
///
/// Existing declarations keep their original text; only declarations
/// whose property name is already present are dropped. The result joins
/// declarations with `"; "` and carries no trailing semicolon.
pub(crate) fn merge(existing: Option<&str>) -> String {
    let mut merged: Vec<(String, String)> = Vec::new();
    merged.push(("font-weight".to_string(), "font-weight: normal".to_string()));

    let declarations = existing.map(parse).unwrap_or_default();
    if !declarations.iter().any(|(name, _)| name == "text-align") {
        merged.push(("text-align".to_string(), "text-align: left".to_string()));
    }
    for (name, text) in declarations {
        if !merged.iter().any(|(seen, _)| *seen == name) {
            merged.push((name, text));
        }
    }

    let texts: Vec<String> = merged.into_iter().map(|(_, text)| text).collect();
    texts.join("; ")
}

/// Split a style value into `(property, verbatim declaration)` pairs.
/// Empty segments (doubled or trailing semicolons) are dropped.
fn parse(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|segment| {
            let text = segment.trim();
            if text.is_empty() {
                return None;
            }
            let name = text
                .split(':')
                .next()
                .unwrap_or(text)
                .trim()
                .to_ascii_lowercase();
            Some((name, text.to_string()))
        })
        .collect()
}
