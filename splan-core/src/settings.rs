//! Tool selection and per-session generation settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Range accepted for [`ToolSettings::num_questions`].
pub const QUESTIONS_RANGE: (u32, u32) = (1, 20);
/// Range accepted for [`ToolSettings::num_flashcards`].
pub const FLASHCARDS_RANGE: (u32, u32) = (1, 50);

/// Which generator a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolType {
    #[default]
    Summarize,
    Flashcards,
    Quiz,
}

impl ToolType {
    pub const ALL: [ToolType; 3] = [ToolType::Summarize, ToolType::Flashcards, ToolType::Quiz];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::Summarize => "summarize",
            ToolType::Flashcards => "flashcards",
            ToolType::Quiz => "quiz",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    /// Upper bound on key points for this length.
    pub fn max_points(&self) -> usize {
        match self {
            SummaryLength::Short => 3,
            SummaryLength::Medium => 5,
            SummaryLength::Long => 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizType {
    #[default]
    MultipleChoice,
    TrueFalse,
    FillInBlanks,
}

impl QuizType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizType::MultipleChoice => "multiple-choice",
            QuizType::TrueFalse => "true-false",
            QuizType::FillInBlanks => "fill-in-blanks",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// Error returned when a settings value cannot be parsed from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! str_enum {
    ($ty:ty, $kind:literal, [$($variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                [$($variant),+]
                    .into_iter()
                    .find(|v: &$ty| v.as_str() == wanted)
                    .ok_or_else(|| UnknownVariant {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(ToolType, "tool", [ToolType::Summarize, ToolType::Flashcards, ToolType::Quiz]);
str_enum!(SummaryLength, "summary length", [SummaryLength::Short, SummaryLength::Medium, SummaryLength::Long]);
str_enum!(QuizType, "quiz type", [QuizType::MultipleChoice, QuizType::TrueFalse, QuizType::FillInBlanks]);
str_enum!(Difficulty, "difficulty", [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]);

/// Settings shared by every tool in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ToolSettings {
    pub summary_length: SummaryLength,
    pub quiz_type: QuizType,
    pub difficulty: Difficulty,
    pub num_questions: u32,
    pub num_flashcards: u32,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            summary_length: SummaryLength::Medium,
            quiz_type: QuizType::MultipleChoice,
            difficulty: Difficulty::Medium,
            num_questions: 5,
            num_flashcards: 10,
        }
    }
}

impl ToolSettings {
    /// Shallow merge: fields present in `patch` replace ours, counts are clamped into range.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.summary_length {
            self.summary_length = v;
        }
        if let Some(v) = patch.quiz_type {
            self.quiz_type = v;
        }
        if let Some(v) = patch.difficulty {
            self.difficulty = v;
        }
        if let Some(v) = patch.num_questions {
            self.num_questions = v.clamp(QUESTIONS_RANGE.0, QUESTIONS_RANGE.1);
        }
        if let Some(v) = patch.num_flashcards {
            self.num_flashcards = v.clamp(FLASHCARDS_RANGE.0, FLASHCARDS_RANGE.1);
        }
        debug!(settings = ?self, "Tool settings updated");
    }

    /// Checks the numeric fields, which are public and may bypass [`ToolSettings::apply`].
    pub fn validate(&self) -> Result<(), String> {
        let (qmin, qmax) = QUESTIONS_RANGE;
        if !(qmin..=qmax).contains(&self.num_questions) {
            return Err(format!(
                "num_questions must be within {qmin}..={qmax}, got {}",
                self.num_questions
            ));
        }
        let (fmin, fmax) = FLASHCARDS_RANGE;
        if !(fmin..=fmax).contains(&self.num_flashcards) {
            return Err(format!(
                "num_flashcards must be within {fmin}..={fmax}, got {}",
                self.num_flashcards
            ));
        }
        Ok(())
    }
}

/// Partial update for [`ToolSettings`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub summary_length: Option<SummaryLength>,
    pub quiz_type: Option<QuizType>,
    pub difficulty: Option<Difficulty>,
    pub num_questions: Option<u32>,
    pub num_flashcards: Option<u32>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == SettingsPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_merges_and_clamps() {
        let mut settings = ToolSettings::default();
        settings.apply(&SettingsPatch {
            quiz_type: Some(QuizType::TrueFalse),
            num_questions: Some(99),
            num_flashcards: Some(0),
            ..Default::default()
        });
        assert_eq!(settings.quiz_type, QuizType::TrueFalse);
        assert_eq!(settings.summary_length, SummaryLength::Medium);
        assert_eq!(settings.num_questions, 20);
        assert_eq!(settings.num_flashcards, 1);
    }

    #[test]
    fn parses_kebab_case_names() {
        assert_eq!("fill-in-blanks".parse::<QuizType>().unwrap(), QuizType::FillInBlanks);
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("medium-ish".parse::<SummaryLength>().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_counts() {
        let settings = ToolSettings {
            num_questions: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
        assert!(ToolSettings::default().validate().is_ok());
    }
}
