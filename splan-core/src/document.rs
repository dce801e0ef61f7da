//! Structured study documents and their markdown form.
//!
//! Generators build these records directly. Markdown is produced only when a
//! document is shown or exported, and [`FlashcardDeck::from_markdown`] /
//! [`Quiz::from_markdown`] read exported files back into the same records.

use crate::settings::{Difficulty, QuizType, ToolType};
use crate::topic::Topic;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Replaces the hidden keyword in fronts and prompts.
pub const BLANK: &str = "_____";
/// Stands in for the keyword when a sentence has no word longer than three characters.
pub const NO_KEYWORD: &str = "(no keyword)";

const RULE: &str = "\n\n---\n\n";
const EMPHASIS: [&str; 3] = ["CRITICAL: ", "HIGHLIGHT: ", "IMPORTANT: "];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("missing or malformed title line")]
    MissingTitle,
    #[error("unknown topic '{0}'")]
    UnknownTopic(String),
    #[error("card found before any '### Topic:' header")]
    CardOutsideTopic,
    #[error("question {0} has no answer line")]
    MissingAnswer(usize),
    #[error("question {0} has no prompt")]
    MissingPrompt(usize),
    #[error("unrecognised quiz title '{0}'")]
    UnknownQuizTitle(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub points: Vec<String>,
}

impl Summary {
    pub fn to_markdown(&self) -> String {
        let points: Vec<String> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, point)| format!("• {}{}", EMPHASIS.get(i).copied().unwrap_or(""), point))
            .collect();
        format!("# Summary\n\n## Key Points\n\n{}", points.join("\n\n"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCards {
    pub topic: Topic,
    pub cards: Vec<Flashcard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlashcardDeck {
    pub topics: Vec<TopicCards>,
}

impl FlashcardDeck {
    pub fn len(&self) -> usize {
        self.topics.iter().map(|t| t.cards.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn topic_names(&self) -> Vec<Topic> {
        self.topics.iter().map(|t| t.topic).collect()
    }

    pub fn cards(&self) -> impl Iterator<Item = &Flashcard> {
        self.topics.iter().flat_map(|t| t.cards.iter())
    }

    /// Restricts the deck to one topic; `None` keeps every topic.
    pub fn filter_topic(&self, topic: Option<Topic>) -> FlashcardDeck {
        match topic {
            None => self.clone(),
            Some(wanted) => FlashcardDeck {
                topics: self
                    .topics
                    .iter()
                    .filter(|t| t.topic == wanted)
                    .cloned()
                    .collect(),
            },
        }
    }

    pub fn to_markdown(&self) -> String {
        let sections: Vec<String> = self
            .topics
            .iter()
            .map(|group| {
                let cards: Vec<String> = group
                    .cards
                    .iter()
                    .enumerate()
                    .map(|(i, card)| {
                        format!(
                            "### Card {}\n\n**Front:** {}\n\n**Back:** {}",
                            i + 1,
                            card.front,
                            card.back
                        )
                    })
                    .collect();
                format!("### Topic: {}\n\n{}", group.topic, cards.join(RULE))
            })
            .collect();
        format!("# Study Flashcards\n\n{}", sections.join(RULE))
    }

    pub fn from_markdown(markdown: &str) -> Result<Self, ParseError> {
        let mut lines = markdown.lines().map(str::trim).filter(|l| !l.is_empty());
        match lines.next() {
            Some(title) if title.starts_with("# ") => {}
            _ => return Err(ParseError::MissingTitle),
        }

        let mut deck = FlashcardDeck::default();
        let mut front: Option<String> = None;
        for line in lines {
            if let Some(name) = line.strip_prefix("### Topic:") {
                let topic = name
                    .trim()
                    .parse::<Topic>()
                    .map_err(|_| ParseError::UnknownTopic(name.trim().to_string()))?;
                deck.topics.push(TopicCards {
                    topic,
                    cards: Vec::new(),
                });
                front = None;
            } else if let Some(value) = line.strip_prefix("**Front:**") {
                front = Some(value.trim().to_string());
            } else if let Some(value) = line.strip_prefix("**Back:**") {
                let back = value.trim().to_string();
                let Some(front) = front.take().filter(|f| !f.is_empty()) else {
                    continue;
                };
                if back.is_empty() {
                    continue;
                }
                let group = deck.topics.last_mut().ok_or(ParseError::CardOutsideTopic)?;
                group.cards.push(Flashcard { front, back });
            }
        }
        Ok(deck)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub options: Option<Vec<String>>,
    pub answer: String,
}

impl QuizQuestion {
    /// Grades a response. Letters `a`, `b`, ... pick the matching option.
    pub fn is_correct(&self, response: &str) -> bool {
        let response = response.trim();
        let chosen = self
            .options
            .as_ref()
            .and_then(|options| option_by_letter(options, response))
            .unwrap_or(response);
        chosen.eq_ignore_ascii_case(self.answer.trim())
    }
}

fn option_by_letter<'a>(options: &'a [String], response: &str) -> Option<&'a str> {
    let mut chars = response.chars();
    let letter = chars.next().filter(|c| c.is_ascii_lowercase() || c.is_ascii_uppercase())?;
    let rest = chars.as_str();
    if !(rest.is_empty() || rest == ")") {
        return None;
    }
    let index = (letter.to_ascii_lowercase() as u8 - b'a') as usize;
    options.get(index).map(String::as_str)
}

fn option_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]\)\s*(.*)$").expect("option pattern is valid"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub difficulty: Difficulty,
    pub quiz_type: QuizType,
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// e.g. `Medium Multiple Choice Quiz`.
    pub fn title(&self) -> String {
        let words: Vec<String> = std::iter::once(self.difficulty.as_str())
            .chain(self.quiz_type.as_str().split('-'))
            .map(capitalize)
            .collect();
        format!("{} Quiz", words.join(" "))
    }

    pub fn to_markdown(&self) -> String {
        let questions: Vec<String> = self
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let heading = format!("### Question {}", i + 1);
                match (&self.quiz_type, &q.options) {
                    (QuizType::TrueFalse, _) => format!(
                        "{heading}\n\n**Statement:** {}\n\n**Answer:** {}",
                        q.prompt, q.answer
                    ),
                    (_, Some(options)) => {
                        let lettered: Vec<String> = options
                            .iter()
                            .enumerate()
                            .map(|(j, opt)| format!("{}) {}", (b'a' + j as u8) as char, opt))
                            .collect();
                        format!(
                            "{heading}\n\n{}\n\n{}\n\n**Correct Answer:** {}",
                            q.prompt,
                            lettered.join("\n"),
                            q.answer
                        )
                    }
                    (_, None) => format!("{heading}\n\n{}\n\n**Answer:** {}", q.prompt, q.answer),
                }
            })
            .collect();
        format!("# {}\n\n{}", self.title(), questions.join(RULE))
    }

    pub fn from_markdown(markdown: &str) -> Result<Self, ParseError> {
        let mut lines = markdown.lines().map(str::trim).filter(|l| !l.is_empty());
        let title = lines
            .next()
            .and_then(|l| l.strip_prefix("# "))
            .ok_or(ParseError::MissingTitle)?;
        let (difficulty, quiz_type) = parse_quiz_title(title)?;

        let mut questions = Vec::new();
        let mut current: Option<PartialQuestion> = None;
        for line in lines {
            if line.starts_with("### Question") {
                if let Some(done) = current.take() {
                    questions.push(done.finish(questions.len() + 1)?);
                }
                current = Some(PartialQuestion::default());
                continue;
            }
            let Some(q) = current.as_mut() else { continue };
            if line == "---" {
                continue;
            }
            if let Some(v) = line.strip_prefix("**Correct Answer:**") {
                q.answer = Some(v.trim().to_string());
            } else if let Some(v) = line.strip_prefix("**Answer:**") {
                q.answer = Some(v.trim().to_string());
            } else if let Some(v) = line.strip_prefix("**Statement:**") {
                q.prompt = Some(v.trim().to_string());
            } else if q.prompt.is_none() {
                q.prompt = Some(line.to_string());
            } else if let Some(caps) = option_line().captures(line) {
                q.options.push(caps[1].trim().to_string());
            }
        }
        if let Some(done) = current.take() {
            questions.push(done.finish(questions.len() + 1)?);
        }

        Ok(Quiz {
            difficulty,
            quiz_type,
            questions,
        })
    }
}

#[derive(Default)]
struct PartialQuestion {
    prompt: Option<String>,
    options: Vec<String>,
    answer: Option<String>,
}

impl PartialQuestion {
    fn finish(self, number: usize) -> Result<QuizQuestion, ParseError> {
        Ok(QuizQuestion {
            prompt: self.prompt.ok_or(ParseError::MissingPrompt(number))?,
            options: (!self.options.is_empty()).then_some(self.options),
            answer: self.answer.ok_or(ParseError::MissingAnswer(number))?,
        })
    }
}

fn parse_quiz_title(title: &str) -> Result<(Difficulty, QuizType), ParseError> {
    let unknown = || ParseError::UnknownQuizTitle(title.to_string());
    let body = title.trim().strip_suffix(" Quiz").ok_or_else(unknown)?;
    let (difficulty, kind) = body.split_once(' ').ok_or_else(unknown)?;
    let difficulty = difficulty.parse::<Difficulty>().map_err(|_| unknown())?;
    let quiz_type = kind
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .parse::<QuizType>()
        .map_err(|_| unknown())?;
    Ok((difficulty, quiz_type))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Output of one generator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StudyDocument {
    Summary(Summary),
    Flashcards(FlashcardDeck),
    Quiz(Quiz),
}

impl StudyDocument {
    pub fn tool(&self) -> ToolType {
        match self {
            StudyDocument::Summary(_) => ToolType::Summarize,
            StudyDocument::Flashcards(_) => ToolType::Flashcards,
            StudyDocument::Quiz(_) => ToolType::Quiz,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            StudyDocument::Summary(s) => s.points.is_empty(),
            StudyDocument::Flashcards(d) => d.is_empty(),
            StudyDocument::Quiz(q) => q.questions.is_empty(),
        }
    }

    pub fn to_markdown(&self) -> String {
        match self {
            StudyDocument::Summary(s) => s.to_markdown(),
            StudyDocument::Flashcards(d) => d.to_markdown(),
            StudyDocument::Quiz(q) => q.to_markdown(),
        }
    }
}
