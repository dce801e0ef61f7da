use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Largest file accepted for ingestion: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Settings for the file ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub max_file_size: u64,
    /// Tesseract language code passed with `-l`.
    pub ocr_language: String,
    pub tesseract_bin: PathBuf,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            ocr_language: "eng".to_string(),
            tesseract_bin: PathBuf::from("tesseract"),
        }
    }
}

impl IngestConfig {
    pub fn trace_loaded(&self) {
        info!(
            max_file_size = self.max_file_size,
            ocr_language = %self.ocr_language,
            tesseract_bin = %self.tesseract_bin.display(),
            "Loaded ingest config"
        );
        debug!(?self, "Ingest config (full debug)");
    }
}
