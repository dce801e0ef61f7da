use async_trait::async_trait;
use splan_core::contract::{CollaboratorError, MockOcrEngine, MockPdfTextLoader, OcrEngine};
use splan_core::document::StudyDocument;
use splan_core::error::{IngestError, SessionError};
use splan_core::export::{write_combined, write_document, ExportFormat, COMBINED_FILE_NAME};
use splan_core::ingest::{FileIngestor, IngestFile};
use splan_core::session::Session;
use splan_core::settings::{QuizType, SettingsPatch, SummaryLength, ToolSettings, ToolType};
use splan_core::store::{Action, MessageKind, NewMessage, Outcome, Role, SessionStore};
use std::future::{poll_fn, Future};
use std::pin::Pin;
use std::sync::Arc;
use std::task::Poll;
use tempfile::tempdir;

const NOTES: &str = "Mitochondria produce most of the cell's energy. \
    Ribosomes assemble proteins from amino acids. \
    The nucleus stores genetic information as DNA. \
    Lysosomes break down worn out cell parts.";

fn offline_ingestor() -> FileIngestor {
    FileIngestor::with_engines(1024, Arc::new(MockOcrEngine::new()), Arc::new(MockPdfTextLoader::new()))
}

fn session(seed: u64) -> Session {
    Session::with_seed(ToolSettings::default(), offline_ingestor(), seed)
}

/// OCR that never answers, so an image ingest stays in flight.
struct StalledOcr;

#[async_trait]
impl OcrEngine for StalledOcr {
    async fn recognize(&self, _image: Vec<u8>, _media_type: String) -> Result<String, CollaboratorError> {
        std::future::pending().await
    }
}

fn stalled_session() -> Session {
    let ingestor = FileIngestor::with_engines(1024, Arc::new(StalledOcr), Arc::new(MockPdfTextLoader::new()));
    Session::with_seed(ToolSettings::default(), ingestor, 13)
}

fn scan() -> IngestFile {
    IngestFile::from_bytes("scan.png", "image/png", vec![0u8; 16])
}

/// Polls `future` a single time and reports whether it is still pending.
async fn poll_once<F: Future + Unpin>(future: &mut F) -> bool {
    poll_fn(|cx| Poll::Ready(Pin::new(&mut *future).poll(cx).is_pending())).await
}

#[test]
fn test_store_assigns_unique_ids_and_removes_by_id() {
    let mut store = SessionStore::default();
    let first = match store.apply(Action::AddMessage(NewMessage::user_text("one"))) {
        Outcome::Added(id) => id,
        other => panic!("Expected Added, got {other:?}"),
    };
    let second = match store.apply(Action::AddMessage(NewMessage::assistant_text("two"))) {
        Outcome::Added(id) => id,
        other => panic!("Expected Added, got {other:?}"),
    };
    assert_ne!(first, second);
    assert_eq!(first.get_version_num(), 4);

    assert_eq!(store.apply(Action::RemoveMessage(first)), Outcome::Applied);
    assert_eq!(store.apply(Action::RemoveMessage(first)), Outcome::NotFound);
    assert_eq!(store.messages().len(), 1);
    assert_eq!(store.messages()[0].id, second);

    let third = store.add_message(NewMessage::user_file("notes.txt", "three"));
    assert_eq!(store.messages().last().map(|m| m.id), Some(third));

    store.apply(Action::ClearMessages);
    assert!(store.messages().is_empty());
}

#[test]
fn test_store_settings_patch_is_shallow_and_clamped() {
    let mut store = SessionStore::default();
    store.apply(Action::UpdateSettings(SettingsPatch {
        summary_length: Some(SummaryLength::Long),
        num_flashcards: Some(500),
        ..Default::default()
    }));
    let settings = store.settings();
    assert_eq!(settings.summary_length, SummaryLength::Long);
    assert_eq!(settings.quiz_type, QuizType::MultipleChoice);
    assert_eq!(settings.num_flashcards, 50);
    assert_eq!(settings.num_questions, 5);
}

#[tokio::test]
async fn test_submit_replaces_history_with_user_and_assistant() {
    let mut session = session(7);
    session.select_tool(ToolType::Summarize);

    session.submit("Old text. More old text.").await.expect("First submit");
    let id = session.submit(NOTES).await.expect("Second submit");

    let messages = session.store().messages();
    assert_eq!(messages.len(), 2, "History should be cleared before each run");
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content(), NOTES);
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].id, id);
    match messages[1].document() {
        Some(StudyDocument::Summary(summary)) => assert_eq!(summary.points.len(), 4),
        other => panic!("Expected a summary, got {other:?}"),
    }
    assert!(!session.store().is_processing());
}

#[tokio::test]
async fn test_blank_submit_is_rejected_without_touching_history() {
    let mut session = session(1);
    session.submit(NOTES).await.unwrap();

    let err = session.submit("   \n ").await.expect_err("Blank input should be refused");
    assert!(matches!(err, SessionError::EmptyInput));
    assert_eq!(session.store().messages().len(), 2);
}

#[tokio::test]
async fn test_invalid_settings_become_apology_message() {
    let settings = ToolSettings {
        num_questions: 0,
        ..ToolSettings::default()
    };
    let mut session = Session::with_seed(settings, offline_ingestor(), 3);
    session.select_tool(ToolType::Quiz);

    session.submit(NOTES).await.expect("Failures are reported in history");
    let last = session.store().last_assistant_message().expect("Assistant reply");
    assert_eq!(
        last.content(),
        "Sorry, I encountered an error processing your request. Please try again."
    );
}

#[tokio::test]
async fn test_generate_uses_stored_input_and_settings() {
    let mut session = session(5);
    session.select_tool(ToolType::Quiz);
    session.update_settings(SettingsPatch {
        quiz_type: Some(QuizType::FillInBlanks),
        num_questions: Some(3),
        ..Default::default()
    });
    session.set_input_text(NOTES);

    session.generate().await.expect("Generate should succeed");
    let messages = session.store().messages();
    assert_eq!(messages.len(), 1, "Generate keeps only the result");
    match messages[0].document() {
        Some(StudyDocument::Quiz(quiz)) => {
            assert_eq!(quiz.quiz_type, QuizType::FillInBlanks);
            assert_eq!(quiz.questions.len(), 3);
        }
        other => panic!("Expected a quiz, got {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_without_input_is_empty_input() {
    let mut session = session(5);
    let err = session.generate().await.expect_err("Nothing to generate from");
    assert!(matches!(err, SessionError::EmptyInput));
}

#[tokio::test]
async fn test_ingest_stores_text_and_file_message() {
    let mut session = session(2);
    let file = IngestFile::from_bytes("cells.txt", "text/plain", NOTES.as_bytes().to_vec());

    let text = session.ingest(&file, None).await.expect("Ingest should succeed");
    assert_eq!(session.store().input_text(), text);
    let message = &session.store().messages()[0];
    assert_eq!(message.kind, MessageKind::File);
    assert_eq!(message.file_name.as_deref(), Some("cells.txt"));
    assert!(!session.store().is_processing());
}

#[tokio::test]
async fn test_failed_ingest_leaves_input_untouched() {
    let mut session = session(2);
    session.set_input_text("Existing notes stay put.");
    let file = IngestFile::from_bytes("huge.txt", "text/plain", vec![b'x'; 2048]);

    let err = session.ingest(&file, None).await.expect_err("Too large");
    assert!(matches!(err, SessionError::Ingest(IngestError::SizeLimitExceeded { .. })));
    assert_eq!(session.store().input_text(), "Existing notes stay put.");
    assert!(session.store().messages().is_empty());
    assert!(!session.store().is_processing());
}

#[tokio::test]
async fn test_back_clears_tool_input_and_history() {
    let mut session = session(4);
    session.set_input_text(NOTES);
    session.generate().await.unwrap();

    session.back();
    assert_eq!(session.store().selected_tool(), None);
    assert_eq!(session.store().input_text(), "");
    assert!(session.store().messages().is_empty());
}

#[tokio::test]
async fn test_same_seed_gives_same_session_output() {
    let mut a = session(99);
    let mut b = session(99);
    for s in [&mut a, &mut b] {
        s.select_tool(ToolType::Flashcards);
        s.submit(NOTES).await.unwrap();
    }
    assert_eq!(
        a.store().messages()[1].content(),
        b.store().messages()[1].content()
    );
}

#[tokio::test]
async fn test_export_writes_markdown_pdf_and_combined() {
    let dir = tempdir().unwrap();
    let mut session = session(8);
    session.set_input_text(NOTES);

    let materials = session.generate_all().await.expect("All three documents");
    assert_eq!(materials.summary.tool(), ToolType::Summarize);
    assert_eq!(materials.flashcards.tool(), ToolType::Flashcards);
    assert_eq!(materials.quiz.tool(), ToolType::Quiz);

    let md = write_document(&materials.quiz, ExportFormat::Markdown, dir.path())
        .await
        .expect("Markdown export");
    assert!(md.file_name().unwrap().to_string_lossy().starts_with("quiz-"));

    let pdf = write_document(&materials.summary, ExportFormat::Pdf, &dir.path().join("out/summary.pdf"))
        .await
        .expect("PDF export");
    assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF"));

    let combined = write_combined(&materials, dir.path()).await.expect("Combined export");
    assert_eq!(combined, dir.path().join(COMBINED_FILE_NAME));
    assert!(std::fs::read(&combined).unwrap().starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_history_serializes_with_document_kind() {
    let mut session = session(6);
    session.select_tool(ToolType::Flashcards);
    session.submit(NOTES).await.unwrap();

    let json = serde_json::to_value(session.store().messages()).expect("History should serialize");
    assert_eq!(json[0]["role"], "user");
    assert_eq!(json[1]["role"], "assistant");
    assert_eq!(json[1]["body"]["type"], "document");
    assert_eq!(json[1]["body"]["value"]["kind"], "flashcards");
}

#[tokio::test]
async fn test_requests_are_refused_while_one_is_in_flight() {
    let mut session = stalled_session();
    session.set_input_text(NOTES);
    let file = scan();

    let mut pending = Box::pin(session.ingest(&file, None));
    assert!(poll_once(&mut pending).await, "OCR never completes");
    // Keep the ingest in flight without ever finishing it.
    std::mem::forget(pending);

    assert!(session.store().is_processing());
    assert!(matches!(session.submit(NOTES).await, Err(SessionError::Busy)));
    assert!(matches!(session.generate().await, Err(SessionError::Busy)));
    assert!(matches!(session.generate_all().await, Err(SessionError::Busy)));
    assert!(matches!(session.ingest(&scan(), None).await, Err(SessionError::Busy)));
    assert!(session.store().messages().is_empty());
    assert_eq!(session.store().input_text(), NOTES);
}

#[tokio::test]
async fn test_cancelled_ingest_releases_the_session() {
    let mut session = stalled_session();
    let file = scan();
    {
        let mut pending = Box::pin(session.ingest(&file, None));
        assert!(poll_once(&mut pending).await, "OCR never completes");
    }

    assert!(!session.store().is_processing(), "Dropping the request clears the flag");
    assert!(session.store().messages().is_empty());
    session.select_tool(ToolType::Summarize);
    session.submit(NOTES).await.expect("Session should accept new work");
    assert_eq!(session.store().messages().len(), 2);
}

#[tokio::test]
async fn test_dropped_submit_leaves_history_consistent() {
    let mut session = session(12);
    session.select_tool(ToolType::Summarize);
    session.submit(NOTES).await.expect("First submit");

    let finished = {
        let mut pending = Box::pin(session.submit("Ribosomes assemble proteins from amino acids."));
        !poll_once(&mut pending).await
    };

    assert!(!session.store().is_processing());
    let messages = session.store().messages();
    assert_eq!(messages.len(), 2, "History is replaced whole or not at all");
    let expected_user = if finished {
        "Ribosomes assemble proteins from amino acids."
    } else {
        NOTES
    };
    assert_eq!(messages[0].content(), expected_user);

    session.submit(NOTES).await.expect("Session should accept new work");
    assert_eq!(session.store().messages().len(), 2);
}
