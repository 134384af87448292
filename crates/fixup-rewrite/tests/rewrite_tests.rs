//! Integration tests for the rewrite engine: pass-through, `<html>`,
//! `<main>` insertion, generator stamping, and the TOC `<nav>` title.

use std::io::Cursor;

use fixup_common::{Diagnostic, MemoryReporter};
use fixup_rewrite::rewrite;

/// Helper to run the full pipeline over a string.
fn fixup(input: &str) -> (String, Vec<Diagnostic>) {
    let mut reporter = MemoryReporter::default();
    let out = rewrite(Cursor::new(input.to_string()), Vec::new(), &mut reporter)
        .expect("rewrite failed");
    (
        String::from_utf8(out).expect("output was not UTF-8"),
        reporter.diagnostics,
    )
}

/// Helper asserting a clean run and returning just the output.
fn fixup_ok(input: &str) -> String {
    let (out, diagnostics) = fixup(input);
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
    out
}

#[test]
fn test_pass_through() {
    let input = "<div class=\"x\">\n  <p>hi <b>there</b></p>\n  <!-- note -->\n</div>\n";
    assert_eq!(fixup_ok(input), input);
}

#[test]
fn test_html_element_is_canonicalized() {
    let input = "<html xmlns=\"http://www.w3.org/1999/xhtml\" lang=\"\" xml:lang=\"\">\n";
    assert_eq!(fixup_ok(input), "<html lang=\"en\">\n");
}

#[test]
fn test_html_rewrite_is_idempotent() {
    let once = fixup_ok("<html lang=\"en\">\n");
    assert_eq!(once, "<html lang=\"en\">\n");
    assert_eq!(fixup_ok(&once), once);
}

#[test]
fn test_main_inserted_before_first_element() {
    let input = "<body>\n<p>hi</p>\n</body>\n";
    let expected = "<body>\n<main><p>hi</p>\n</main></body>\n";
    assert_eq!(fixup_ok(input), expected);
}

#[test]
fn test_main_inserted_before_bare_text() {
    let input = "<body>\nhello\n</body>\n";
    let expected = "<body>\n<main>hello\n</main></body>\n";
    assert_eq!(fixup_ok(input), expected);
}

#[test]
fn test_no_main_for_blank_body() {
    let input = "<body>\n   \n</body>\n";
    assert_eq!(fixup_ok(input), input);
}

#[test]
fn test_no_main_when_content_is_inside_excluded_sections() {
    let input = "<body>\n<header>x</header>\n<footer>y</footer>\n</body>\n";
    assert_eq!(fixup_ok(input), input);
}

#[test]
fn test_main_inserted_for_sibling_after_section() {
    let input = "<body>\n<nav>n</nav>\n<p>x</p>\n</body>\n";
    let expected = "<body>\n<nav>n</nav>\n<main><p>x</p>\n</main></body>\n";
    assert_eq!(fixup_ok(input), expected);
}

#[test]
fn test_synthetic_main_closed_by_section_start() {
    let input = "<body>\n<p>x</p>\n<footer>f</footer>\n</body>\n";
    let expected = "<body>\n<main><p>x</p>\n</main><footer>f</footer>\n</body>\n";
    assert_eq!(fixup_ok(input), expected);
}

#[test]
fn test_explicit_main_suppresses_insertion() {
    let input = "<body>\n<main>\n<p>x</p>\n</main>\n</body>\n";
    assert_eq!(fixup_ok(input), input);
}

#[test]
fn test_generator_content_is_stamped() {
    let input = "<meta name=\"generator\" content=\"pandoc\" />\n";
    let expected = "<meta name=\"generator\" content=\"pandoc,fixuphtml\" />\n";
    assert_eq!(fixup_ok(input), expected);
}

#[test]
fn test_generator_stamp_is_not_doubled() {
    let once = fixup_ok("<meta name=\"generator\" content=\"pandoc\" />\n");
    assert_eq!(fixup_ok(&once), once);
}

#[test]
fn test_other_meta_untouched() {
    let input = "<meta charset=\"utf-8\" />\n<meta name=\"viewport\" content=\"w\" />\n";
    assert_eq!(fixup_ok(input), input);
}

#[test]
fn test_generator_meta_is_reserialized_double_quoted() {
    let input = "<meta name='generator' content='pandoc'>\n";
    let expected = "<meta name=\"generator\" content=\"pandoc,fixuphtml\">\n";
    assert_eq!(fixup_ok(input), expected);
}

#[test]
fn test_toc_nav_gets_a_title() {
    let input = "<nav id=\"TOC\">\n</nav>\n";
    let expected = "<nav id=\"TOC\" title=\"Table Of Contents\">\n</nav>\n";
    assert_eq!(fixup_ok(input), expected);
}

#[test]
fn test_other_nav_untouched() {
    let input = "<nav id=\"menu\">\n</nav>\n";
    assert_eq!(fixup_ok(input), input);
}

#[test]
fn test_toc_title_is_not_doubled() {
    let once = fixup_ok("<nav id=\"TOC\">\n</nav>\n");
    assert_eq!(fixup_ok(&once), once);
}

#[test]
fn test_bad_html_is_reported_and_copied_through() {
    let input = "<p>x</p>\n<$\n";
    let (out, diagnostics) = fixup(input);
    assert_eq!(out, input);
    assert_eq!(diagnostics, [Diagnostic::at(2, "bad html")]);
}

#[test]
fn test_stray_cell_end_tag_passes_through() {
    let input = "a</td>b\n";
    assert_eq!(fixup_ok(input), input);
}

#[test]
fn test_script_copied_verbatim() {
    let input = "<body>\n<script>\nif (a < b) { document.write(\"<td>\"); }\n</script>\n</body>\n";
    let expected =
        "<body>\n<main><script>\nif (a < b) { document.write(\"<td>\"); }\n</script>\n</main></body>\n";
    assert_eq!(fixup_ok(input), expected);
}

#[test]
fn test_pandoc_document_end_to_end() {
    let input = "\
<?xml version=\"1.0\" encoding=\"utf-8\"?>
<!DOCTYPE html>
<html xmlns=\"http://www.w3.org/1999/xhtml\" lang=\"\" xml:lang=\"\">
<head>
<meta charset=\"utf-8\" />
<meta name=\"generator\" content=\"pandoc\" />
<title>doc</title>
</head>
<body>
<nav id=\"TOC\">
<ul>
<li>one</li>
</ul>
</nav>
<h1>Title</h1>
<p>text</p>
</body>
</html>
";
    let expected = "\
<?xml version=\"1.0\" encoding=\"utf-8\"?>
<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\" />
<meta name=\"generator\" content=\"pandoc,fixuphtml\" />
<title>doc</title>
</head>
<body>
<nav id=\"TOC\" title=\"Table Of Contents\">
<ul>
<li>one</li>
</ul>
</nav>
<main><h1>Title</h1>
<p>text</p>
</main></body>
</html>
";
    assert_eq!(fixup_ok(input), expected);
}

#[test]
fn test_second_run_is_a_no_op() {
    let input = "\
<!DOCTYPE html>
<html lang=\"\">
<head>
<meta name=\"generator\" content=\"pandoc\" />
</head>
<body>
<nav id=\"TOC\">
</nav>
<p>x</p>
<table>
<tr>
<td>a</td>
<td>r</td>
</tr>
<tr>
<td>b</td>
<td>r</td>
</tr>
</table>
</body>
</html>
";
    let once = fixup_ok(input);
    assert_eq!(fixup_ok(&once), once);
}
