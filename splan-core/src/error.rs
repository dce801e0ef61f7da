//! Error types for splan operations.

use thiserror::Error;

/// File ingestion failures. All are terminal for the attempted upload.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("file size {size} bytes exceeds the {limit} byte limit")]
    SizeLimitExceeded { size: u64, limit: u64 },

    #[error("failed to read file: {0}")]
    UnreadableFile(String),

    #[error("no readable text found in file")]
    NoReadableText,
}

impl From<std::io::Error> for IngestError {
    fn from(e: std::io::Error) -> Self {
        IngestError::UnreadableFile(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("generation failed: {0}")]
    Failure(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Errors surfaced by [`crate::session::Session`] operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("another request is still being processed")]
    Busy,

    #[error("input text is empty")]
    EmptyInput,

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf rendering failed: {0}")]
    Pdf(String),

    #[error("nothing to export")]
    EmptyDocument,
}
