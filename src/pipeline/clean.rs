//! Input cleaning: deterministic normalisation of raw résumé text.
//!
//! Text pasted from word processors, PDFs and web forms carries artefacts
//! that break line-oriented parsing: `\r\n` line endings, a leading BOM,
//! zero-width joiners inside words, stray control characters (form feeds from
//! PDF extraction, terminal escapes), tab-aligned columns and trailing blanks.
//! These cheap rules remove them before [`super::parse`] sees the text, so
//! the parser's regexes can stay simple.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the per-line rules see every line;
//! invisible characters are removed before whitespace handling so a line
//! containing only a zero-width space trims down to empty.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleaning rules to raw résumé text.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Strip invisible Unicode (BOM, zero-width spaces, soft hyphens) and
///    control characters other than newline, tab, vertical tab and form feed
/// 3. Replace tabs, vertical tabs, form feeds and non-breaking spaces with a
///    single space
/// 4. Trim trailing whitespace per line
pub fn clean_input(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = remove_invisible_chars(&s);
    let s = normalise_spaces(&s);
    trim_trailing_whitespace(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Remove invisible and control characters ─────────────────────────

const INVISIBLE: &[char] = &['\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}'];

fn remove_invisible_chars(input: &str) -> String {
    input
        .chars()
        .filter(|&c| !INVISIBLE.contains(&c))
        .filter(|&c| !c.is_control() || matches!(c, '\n' | '\t' | '\x0B' | '\x0C'))
        .collect()
}

// ── Rule 3: Tabs, page breaks and non-breaking spaces ───────────────────────

static RE_SPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\t\x0B\x0C\u{00A0}]+").unwrap());

fn normalise_spaces(input: &str) -> String {
    RE_SPACE_RUN.replace_all(input, " ").to_string()
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "\u{FEFF}Jane\u{200B} Doe\u{00AD}";
        assert_eq!(remove_invisible_chars(input), "Jane Doe");
    }

    #[test]
    fn test_remove_control_chars() {
        assert_eq!(remove_invisible_chars("a\x1b[1mb\x00c\x07\u{85}"), "a[1mbc");
        assert_eq!(remove_invisible_chars("x\ty\nz\x0cw"), "x\ty\nz\x0cw");
    }

    #[test]
    fn test_form_feed_becomes_space() {
        assert_eq!(normalise_spaces("page one\x0c\x0bpage two"), "page one page two");
        assert_eq!(clean_input("\x0cSKILLS\x0c\n"), " SKILLS");
    }

    #[test]
    fn test_tabs_become_spaces() {
        assert_eq!(normalise_spaces("Acme\t\t| Engineer"), "Acme | Engineer");
        assert_eq!(normalise_spaces("New\u{00A0}York"), "New York");
    }

    #[test]
    fn test_trim_trailing_whitespace() {
        assert_eq!(
            trim_trailing_whitespace("  hello   \nworld  "),
            "  hello\nworld"
        );
    }

    #[test]
    fn test_clean_input_full() {
        let input = "\u{FEFF}JANE DOE  \r\njane@x.com\t\r\n\u{200B}\r\nSKILLS";
        assert_eq!(clean_input(input), "JANE DOE\njane@x.com\n\nSKILLS");
    }
}
