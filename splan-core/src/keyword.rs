//! Keyword selection shared by the flashcard and quiz builders.

use crate::document::BLANK;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

/// Words must be longer than this many characters to be hidden or offered as options.
pub const MIN_KEYWORD_CHARS: usize = 3;

fn word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\S+").expect("word pattern is valid"))
}

/// A whitespace-delimited word and its byte span inside the sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Every word longer than [`MIN_KEYWORD_CHARS`], in sentence order.
pub fn eligible_words(sentence: &str) -> Vec<Word<'_>> {
    word()
        .find_iter(sentence)
        .filter(|m| m.as_str().chars().count() > MIN_KEYWORD_CHARS)
        .map(|m| Word {
            text: m.as_str(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Picks one eligible word uniformly at random, or `None` when the sentence has none.
pub fn pick_keyword<'a, R: Rng + ?Sized>(words: &[Word<'a>], rng: &mut R) -> Option<Word<'a>> {
    words.choose(rng).copied()
}

/// Replaces exactly the chosen occurrence, leaving identical words elsewhere alone.
pub fn replace_word(sentence: &str, word: &Word<'_>, with: &str) -> String {
    let mut out = String::with_capacity(sentence.len() + with.len());
    out.push_str(&sentence[..word.start]);
    out.push_str(with);
    out.push_str(&sentence[word.end..]);
    out
}

pub fn blank_out(sentence: &str, word: &Word<'_>) -> String {
    replace_word(sentence, word, BLANK)
}
