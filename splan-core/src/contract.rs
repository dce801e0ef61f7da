#![allow(unused)]

//! # contract: narrow interfaces to the text-extraction collaborators
//!
//! File ingestion never talks to an OCR engine or a PDF parser directly. It
//! goes through the two seams below, so tests can swap in deterministic mocks
//! and deployments can swap in another engine.
//!
//! - [`OcrEngine`] turns image bytes into text.
//! - [`PdfTextLoader`] opens a PDF and hands back a [`PdfText`] that yields
//!   the text items of one page at a time, so callers can report progress
//!   per page.
//!
//! All traits are annotated for `mockall`; the generated `MockOcrEngine`,
//! `MockPdfTextLoader` and `MockPdfText` are exported under the
//! `test-export-mocks` feature for integration tests.

use async_trait::async_trait;

use mockall::{automock, predicate::*};

/// Boxed error returned by collaborators; ingestion maps it to `UnreadableFile`.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Optical character recognition over a single image.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize the text in `image`, whose declared media type is `media_type`.
    async fn recognize(&self, image: Vec<u8>, media_type: String) -> Result<String, CollaboratorError>;
}

/// Text layer of an opened PDF document.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PdfText: Send + Sync {
    /// Number of pages; pages are numbered from 1.
    fn page_count(&self) -> u32;

    /// Text items of one page, in content-stream order.
    async fn page_items(&self, page: u32) -> Result<Vec<String>, CollaboratorError>;
}

/// Opens PDF documents from raw bytes.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PdfTextLoader: Send + Sync {
    async fn load(&self, bytes: Vec<u8>) -> Result<Box<dyn PdfText>, CollaboratorError>;
}
