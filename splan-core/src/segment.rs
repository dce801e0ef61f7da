//! Splits raw study text into sentence units.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

fn boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+\s+").expect("sentence boundary pattern is valid"))
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// How aggressively trivial fragments are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Keep every non-empty fragment that holds at least one letter or digit.
    #[default]
    Lenient,
    /// Also require more than 10 characters and an ASCII letter.
    Strict,
}

/// A trimmed, single-line sentence taken from the input in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sentence(String);

impl Sentence {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Sentence {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Splits `text` on runs of `.`, `!` or `?` followed by whitespace.
///
/// The last sentence keeps its terminal punctuation since no whitespace follows it.
pub fn segment(text: &str, strictness: Strictness) -> Vec<Sentence> {
    boundary()
        .split(text)
        .map(str::trim)
        .filter(|piece| piece.chars().any(char::is_alphanumeric))
        .filter(|piece| match strictness {
            Strictness::Lenient => true,
            Strictness::Strict => {
                piece.chars().count() > 10 && piece.chars().any(|c| c.is_ascii_alphabetic())
            }
        })
        .map(|piece| Sentence(whitespace_run().replace_all(piece, " ").into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sentences: &[Sentence]) -> Vec<&str> {
        sentences.iter().map(Sentence::as_str).collect()
    }

    #[test]
    fn splits_on_terminal_punctuation_followed_by_space() {
        let got = segment("The cat sat. The dog ran! Birds fly south.", Strictness::Lenient);
        assert_eq!(texts(&got), vec!["The cat sat", "The dog ran", "Birds fly south."]);
    }

    #[test]
    fn punctuation_without_whitespace_does_not_split() {
        let got = segment("Version 1.2 shipped. Pi is 3.14", Strictness::Lenient);
        assert_eq!(texts(&got), vec!["Version 1.2 shipped", "Pi is 3.14"]);
    }

    #[test]
    fn empty_and_punctuation_only_input_yields_nothing() {
        assert!(segment("", Strictness::Lenient).is_empty());
        assert!(segment("   \n\t ", Strictness::Lenient).is_empty());
        assert!(segment("... !!! ?", Strictness::Lenient).is_empty());
    }

    #[test]
    fn strict_drops_short_and_numeric_fragments() {
        let got = segment(
            "Too short. 1234567890123. Photosynthesis converts light into energy.",
            Strictness::Strict,
        );
        assert_eq!(texts(&got), vec!["Photosynthesis converts light into energy."]);
    }

    #[test]
    fn internal_line_breaks_are_collapsed() {
        let got = segment("Mitochondria are\n  the powerhouse\tof the cell.", Strictness::Lenient);
        assert_eq!(texts(&got), vec!["Mitochondria are the powerhouse of the cell."]);
    }
}
