//! Round-robin topic labels used to group flashcards.
//!
//! There is no semantic classification here: sentence `i` lands in
//! `Topic::ALL[i % 3]`. Fixtures and rendered decks depend on this order.

use crate::segment::Sentence;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Definitions,
    Concepts,
    Examples,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Definitions, Topic::Concepts, Topic::Examples];

    pub fn for_index(index: usize) -> Topic {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Topic::Definitions => "Definitions",
            Topic::Concepts => "Concepts",
            Topic::Examples => "Examples",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown topic '{s}'"))
    }
}

/// Buckets sentences by topic, keeping document order inside each bucket.
///
/// Buckets come back in first-appearance order and empty topics are omitted.
pub fn group_by_topic(sentences: &[Sentence]) -> Vec<(Topic, Vec<&Sentence>)> {
    let mut groups: Vec<(Topic, Vec<&Sentence>)> = Vec::new();
    for (index, sentence) in sentences.iter().enumerate() {
        let topic = Topic::for_index(index);
        match groups.iter_mut().find(|(t, _)| *t == topic) {
            Some((_, bucket)) => bucket.push(sentence),
            None => groups.push((topic, vec![sentence])),
        }
    }
    groups
}
