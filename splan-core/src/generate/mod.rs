//! Study material generators.
//!
//! Each generator is a pure function of the sentences, the session settings and
//! a caller-supplied random source. Seed the source to get reproducible output.

pub mod flashcards;
pub mod quiz;
pub mod summary;

use crate::document::StudyDocument;
use crate::error::GenerationError;
use crate::segment::Sentence;
use crate::settings::{ToolSettings, ToolType};
use rand::Rng;
use tracing::{error, info};

pub use flashcards::build_flashcards;
pub use quiz::build_quiz;
pub use summary::summarize;

/// Runs the generator for `tool`.
pub fn generate<R: Rng + ?Sized>(
    tool: ToolType,
    sentences: &[Sentence],
    settings: &ToolSettings,
    rng: &mut R,
) -> Result<StudyDocument, GenerationError> {
    if let Err(reason) = settings.validate() {
        error!(%reason, "Refusing to generate with invalid settings");
        return Err(GenerationError::InvalidSettings(reason));
    }
    info!(tool = %tool, sentences = sentences.len(), "Generating study document");
    let document = match tool {
        ToolType::Summarize => StudyDocument::Summary(summarize(sentences, settings.summary_length)),
        ToolType::Flashcards => {
            StudyDocument::Flashcards(build_flashcards(sentences, settings.num_flashcards, rng))
        }
        ToolType::Quiz => StudyDocument::Quiz(build_quiz(sentences, settings, rng)),
    };
    Ok(document)
}
