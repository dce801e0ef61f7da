//! PDF text layer reader backed by `lopdf`.

use crate::contract::{CollaboratorError, PdfText, PdfTextLoader};
use async_trait::async_trait;
use lopdf::Document;
use std::sync::Arc;
use tracing::debug;

/// Default [`PdfTextLoader`]. Parsing runs on the blocking pool.
#[derive(Debug, Default, Clone)]
pub struct LopdfLoader;

impl LopdfLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PdfTextLoader for LopdfLoader {
    async fn load(&self, bytes: Vec<u8>) -> Result<Box<dyn PdfText>, CollaboratorError> {
        let size = bytes.len();
        let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes))
            .await
            .map_err(|e| format!("PDF load task failed: {e}"))?
            .map_err(|e| format!("Failed to parse PDF: {e}"))?;
        let page_count = doc.get_pages().len() as u32;
        debug!(size, page_count, "Loaded PDF document");
        Ok(Box::new(LopdfText {
            doc: Arc::new(doc),
            page_count,
        }))
    }
}

struct LopdfText {
    doc: Arc<Document>,
    page_count: u32,
}

#[async_trait]
impl PdfText for LopdfText {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    async fn page_items(&self, page: u32) -> Result<Vec<String>, CollaboratorError> {
        let doc = Arc::clone(&self.doc);
        let text = tokio::task::spawn_blocking(move || doc.extract_text(&[page]))
            .await
            .map_err(|e| format!("PDF page task failed: {e}"))?
            .map_err(|e| format!("Failed to extract text from page {page}: {e}"))?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}
