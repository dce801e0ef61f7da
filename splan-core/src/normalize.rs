//! Cleanup applied to every piece of extracted text before it becomes input.

use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    control: Regex,
    percent_escape: Regex,
    horizontal_space: Regex,
    line_breaks: Regex,
    non_printable: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        // C0 and C1 controls other than tab, line feed and carriage return.
        control: Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F-\x{9F}]").expect("valid pattern"),
        percent_escape: Regex::new(r"%[0-9A-F]{2}").expect("valid pattern"),
        horizontal_space: Regex::new(r"[^\S\r\n]+").expect("valid pattern"),
        line_breaks: Regex::new(r" ?[\r\n][\s]*").expect("valid pattern"),
        non_printable: Regex::new(r"[^\x20-\x7E\n]").expect("valid pattern"),
    })
}

/// Normalizes OCR, PDF or file text into plain printable ASCII.
///
/// Page and paragraph breaks survive as single `\n`; every other whitespace
/// run becomes one space.
pub fn clean_text(text: &str) -> String {
    let p = patterns();
    let text = p.control.replace_all(text, "");
    let text = p.percent_escape.replace_all(&text, " ");
    let text = p.horizontal_space.replace_all(&text, " ");
    let text = p.line_breaks.replace_all(&text, "\n");
    let text = p.non_printable.replace_all(&text, "");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_controls_and_collapses_space() {
        assert_eq!(clean_text("Hello\u{0007}   world\t\tagain"), "Hello world again");
    }

    #[test]
    fn replaces_percent_escapes_with_space() {
        assert_eq!(clean_text("Study%20guide%2Cchapter"), "Study guide chapter");
    }

    #[test]
    fn keeps_single_line_breaks_between_pages() {
        assert_eq!(clean_text("page one \r\n\r\n  page two\n"), "page one\npage two");
    }

    #[test]
    fn drops_non_ascii() {
        assert_eq!(clean_text("café “quoted” ok"), "caf quoted ok");
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert!(clean_text(" \n\t \u{0000} ").is_empty());
    }
}
