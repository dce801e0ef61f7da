//! The flows a user drives: chat submit, tool generate, file upload.
//!
//! A [`Session`] owns the [`SessionStore`], one [`FileIngestor`] and the random
//! source handed to the generators. Only one operation may be in flight; the
//! store's processing flag guards that.

use crate::document::StudyDocument;
use crate::error::{GenerationError, SessionError};
use crate::generate::generate;
use crate::ingest::{FileIngestor, IngestFile, ProgressCallback};
use crate::segment::{segment, Sentence, Strictness};
use crate::settings::{SettingsPatch, ToolSettings, ToolType};
use crate::store::{Action, NewMessage, SessionStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Shown in place of a document when generation fails.
pub const APOLOGY: &str = "Sorry, I encountered an error processing your request. Please try again.";

/// All three documents for the combined export, in section order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyMaterials {
    pub summary: StudyDocument,
    pub flashcards: StudyDocument,
    pub quiz: StudyDocument,
}

impl StudyMaterials {
    pub fn sections(&self) -> [&StudyDocument; 3] {
        [&self.summary, &self.flashcards, &self.quiz]
    }
}

pub struct Session {
    store: SessionStore,
    ingestor: FileIngestor,
    rng: StdRng,
}

impl Session {
    pub fn new(settings: ToolSettings, ingestor: FileIngestor) -> Self {
        Self {
            store: SessionStore::new(settings),
            ingestor,
            rng: StdRng::from_entropy(),
        }
    }

    /// Session whose generated documents are reproducible for a given seed.
    pub fn with_seed(settings: ToolSettings, ingestor: FileIngestor, seed: u64) -> Self {
        Self {
            store: SessionStore::new(settings),
            ingestor,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn select_tool(&mut self, tool: ToolType) {
        self.store.apply(Action::SelectTool(Some(tool)));
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        if !patch.is_empty() {
            self.store.apply(Action::UpdateSettings(patch));
        }
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.store.apply(Action::SetInputText(text.into()));
    }

    /// Chat submit: clears history, records `text` as the user message and
    /// appends the generated document, or the apology if generation failed.
    ///
    /// Returns the id of the assistant message. History is only touched once
    /// generation has finished, so a cancelled submit leaves it as it was.
    pub async fn submit(&mut self, text: &str) -> Result<Uuid, SessionError> {
        self.ensure_idle()?;
        if text.trim().is_empty() {
            warn!("Ignoring blank submit");
            return Err(SessionError::EmptyInput);
        }
        info!(chars = text.len(), "Processing submitted text");

        let tool = self.current_tool();
        let job = self.job(tool, text, Strictness::Lenient);
        let result = {
            let _in_flight = InFlight::begin(&mut self.store);
            job.run().await
        };

        self.store.apply(Action::ClearMessages);
        self.store.add_message(NewMessage::user_text(text));
        Ok(self.record_result(result))
    }

    /// Tool generate: runs the selected tool over the stored input text and
    /// replaces the history with the single result.
    pub async fn generate(&mut self) -> Result<Uuid, SessionError> {
        self.ensure_idle()?;
        let text = self.store.input_text().to_string();
        if text.trim().is_empty() {
            warn!("Generate requested with no input text");
            return Err(SessionError::EmptyInput);
        }

        let tool = self.current_tool();
        let job = self.job(tool, &text, Strictness::Strict);
        let result = {
            let _in_flight = InFlight::begin(&mut self.store);
            job.run().await
        };

        self.store.apply(Action::ClearMessages);
        Ok(self.record_result(result))
    }

    /// Reads `file` and makes its text the session input.
    ///
    /// Errors are returned for the caller to display; the store is left as it
    /// was.
    pub async fn ingest(
        &mut self,
        file: &IngestFile,
        progress: Option<ProgressCallback>,
    ) -> Result<String, SessionError> {
        self.ensure_idle()?;
        let result = {
            let _in_flight = InFlight::begin(&mut self.store);
            self.ingestor.ingest(file, progress).await
        };

        let text = result?;
        self.store.apply(Action::SetInputText(text.clone()));
        self.store
            .add_message(NewMessage::user_file(file.name.clone(), text.clone()));
        info!(name = %file.name, chars = text.len(), "File text loaded into session");
        Ok(text)
    }

    /// Summary, flashcards and quiz over the stored input text.
    pub async fn generate_all(&mut self) -> Result<StudyMaterials, SessionError> {
        self.ensure_idle()?;
        let text = self.store.input_text().to_string();
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let jobs: Vec<Job> = ToolType::ALL
            .into_iter()
            .map(|tool| self.job(tool, &text, Strictness::Strict))
            .collect();
        let result = {
            let _in_flight = InFlight::begin(&mut self.store);
            let mut documents = Vec::with_capacity(jobs.len());
            let mut failure = None;
            for job in jobs {
                match job.run().await {
                    Ok(doc) => documents.push(doc),
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }
            match failure {
                Some(e) => Err(e),
                None => Ok(documents),
            }
        };

        let documents = result.map_err(|e| {
            error!(error = %e, "Combined generation failed");
            SessionError::from(e)
        })?;
        let mut docs = documents.into_iter();
        match (docs.next(), docs.next(), docs.next()) {
            (Some(summary), Some(flashcards), Some(quiz)) => {
                info!("Generated combined study materials");
                Ok(StudyMaterials {
                    summary,
                    flashcards,
                    quiz,
                })
            }
            _ => Err(GenerationError::Failure("missing section".to_string()).into()),
        }
    }

    /// Leaves the current tool: deselects it and clears input and history.
    pub fn back(&mut self) {
        self.store.apply(Action::SelectTool(None));
        self.store.apply(Action::SetInputText(String::new()));
        self.store.apply(Action::ClearMessages);
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.store.is_processing() {
            warn!("Request refused while another is in flight");
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    fn current_tool(&self) -> ToolType {
        self.store.selected_tool().unwrap_or_default()
    }

    /// Snapshots everything a generator needs, drawing its seed from the
    /// session rng so seeded sessions stay reproducible.
    fn job(&mut self, tool: ToolType, text: &str, strictness: Strictness) -> Job {
        Job {
            tool,
            sentences: segment(text, strictness),
            settings: self.store.settings().clone(),
            seed: self.rng.gen(),
        }
    }

    fn record_result(&mut self, result: Result<StudyDocument, GenerationError>) -> Uuid {
        let message = match result {
            Ok(doc) => NewMessage::assistant_document(doc),
            Err(e) => {
                error!(error = %e, "Generation failed, replying with apology");
                NewMessage::assistant_text(APOLOGY)
            }
        };
        self.store.add_message(message)
    }
}

/// One generator run, detached from the session so it can be awaited while
/// the store is held by [`InFlight`].
struct Job {
    tool: ToolType,
    sentences: Vec<Sentence>,
    settings: ToolSettings,
    seed: u64,
}

impl Job {
    async fn run(self) -> Result<StudyDocument, GenerationError> {
        let Job {
            tool,
            sentences,
            settings,
            seed,
        } = self;
        tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            generate(tool, &sentences, &settings, &mut rng)
        })
        .await
        .map_err(|e| {
            error!(error = %e, tool = %tool, "Generator task did not complete");
            GenerationError::Failure(e.to_string())
        })?
    }
}

/// Sets the processing flag for one request and clears it on drop, so a
/// request future dropped mid-await does not leave the session busy.
struct InFlight<'a> {
    store: &'a mut SessionStore,
}

impl<'a> InFlight<'a> {
    fn begin(store: &'a mut SessionStore) -> Self {
        store.apply(Action::SetProcessing(true));
        Self { store }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.store.apply(Action::SetProcessing(false));
    }
}
