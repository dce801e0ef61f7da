//! File ingestion: turns an uploaded file into normalized input text.
//!
//! Dispatch is by declared media type, the way the upload widget did it:
//! `image/*` goes through OCR, `application/pdf` through the PDF text layer,
//! anything else is read as text. Whatever comes out is passed through
//! [`clean_text`] and rejected if nothing printable is left.

use crate::config::IngestConfig;
use crate::contract::{OcrEngine, PdfTextLoader};
use crate::error::IngestError;
use crate::normalize::clean_text;
use crate::ocr::TesseractOcr;
use crate::pdf::LopdfLoader;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, warn};

/// Bytes read per step when streaming plain-text files.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Receives progress percentages in `[0, 100]`, never decreasing.
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// Where the file's bytes live.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A file handed to the ingestor together with its declared metadata.
#[derive(Debug, Clone)]
pub struct IngestFile {
    pub name: String,
    pub media_type: String,
    pub size: u64,
    pub source: FileSource,
}

impl IngestFile {
    pub fn from_bytes(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            source: FileSource::Bytes(bytes),
        }
    }

    async fn read_all(&self) -> Result<Vec<u8>, IngestError> {
        match &self.source {
            FileSource::Bytes(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => tokio::fs::read(path).await.map_err(|e| {
                error!(error = ?e, path = %path.display(), "Failed to read file");
                IngestError::from(e)
            }),
        }
    }
}

/// Clamps reported progress to a non-decreasing percentage.
struct Progress {
    callback: Option<ProgressCallback>,
    last: Option<u8>,
}

impl Progress {
    fn new(callback: Option<ProgressCallback>) -> Self {
        Self { callback, last: None }
    }

    fn fraction(&mut self, done: u64, total: u64) {
        let pct = if total == 0 {
            100
        } else {
            ((done as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
        };
        self.percent(pct);
    }

    fn percent(&mut self, pct: u8) {
        let pct = pct.min(100);
        if self.last.is_some_and(|last| pct <= last) {
            return;
        }
        self.last = Some(pct);
        if let Some(cb) = &self.callback {
            cb(pct);
        }
    }
}

enum Route {
    Image,
    Pdf,
    Text,
}

impl Route {
    fn for_media_type(media_type: &str) -> Self {
        if media_type.starts_with("image/") {
            Route::Image
        } else if media_type == "application/pdf" {
            Route::Pdf
        } else {
            Route::Text
        }
    }
}

/// Extracts and normalizes text from uploaded files.
///
/// Holds one OCR engine and one PDF loader for its whole lifetime.
pub struct FileIngestor {
    max_file_size: u64,
    ocr: Arc<dyn OcrEngine>,
    pdf: Arc<dyn PdfTextLoader>,
}

impl FileIngestor {
    /// Ingestor with the tesseract OCR engine and the lopdf reader.
    pub fn new(config: &IngestConfig) -> Self {
        config.trace_loaded();
        Self::with_engines(
            config.max_file_size,
            Arc::new(TesseractOcr::new(
                config.tesseract_bin.clone(),
                config.ocr_language.clone(),
            )),
            Arc::new(LopdfLoader::new()),
        )
    }

    pub fn with_engines(max_file_size: u64, ocr: Arc<dyn OcrEngine>, pdf: Arc<dyn PdfTextLoader>) -> Self {
        Self {
            max_file_size,
            ocr,
            pdf,
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    pub async fn ingest(
        &self,
        file: &IngestFile,
        progress: Option<ProgressCallback>,
    ) -> Result<String, IngestError> {
        info!(name = %file.name, media_type = %file.media_type, size = file.size, "Starting ingestion");

        if file.size > self.max_file_size {
            error!(size = file.size, limit = self.max_file_size, "File exceeds size limit");
            return Err(IngestError::SizeLimitExceeded {
                size: file.size,
                limit: self.max_file_size,
            });
        }

        let mut progress = Progress::new(progress);
        progress.percent(0);

        let raw = match Route::for_media_type(&file.media_type) {
            Route::Image => self.recognize_image(file).await?,
            Route::Pdf => self.extract_pdf(file, &mut progress).await?,
            Route::Text => read_text(file, &mut progress).await?,
        };

        let cleaned = clean_text(&raw);
        if cleaned.is_empty() {
            error!(name = %file.name, raw_len = raw.len(), "No readable text after normalization");
            return Err(IngestError::NoReadableText);
        }
        progress.percent(100);
        info!(name = %file.name, chars = cleaned.len(), "Ingestion completed successfully");
        Ok(cleaned)
    }

    async fn recognize_image(&self, file: &IngestFile) -> Result<String, IngestError> {
        let bytes = file.read_all().await?;
        self.ocr
            .recognize(bytes, file.media_type.clone())
            .await
            .map_err(|e| {
                error!(error = %e, name = %file.name, "OCR failed");
                IngestError::UnreadableFile(e.to_string())
            })
    }

    async fn extract_pdf(&self, file: &IngestFile, progress: &mut Progress) -> Result<String, IngestError> {
        let bytes = file.read_all().await?;
        let doc = self.pdf.load(bytes).await.map_err(|e| {
            error!(error = %e, name = %file.name, "Failed to open PDF");
            IngestError::UnreadableFile(e.to_string())
        })?;

        let pages = doc.page_count();
        let mut text = String::new();
        for page in 1..=pages {
            let items = doc.page_items(page).await.map_err(|e| {
                error!(error = %e, page, "Failed to read PDF page");
                IngestError::UnreadableFile(e.to_string())
            })?;
            text.push_str(&items.join(" "));
            text.push('\n');
            debug!(page, pages, items = items.len(), "Extracted PDF page");
            progress.fraction(page as u64, pages as u64);
        }
        Ok(clean_text(&text))
    }
}

async fn read_text(file: &IngestFile, progress: &mut Progress) -> Result<String, IngestError> {
    let mut buffer: Vec<u8> = Vec::new();
    match &file.source {
        FileSource::Bytes(bytes) => {
            let total = bytes.len() as u64;
            for chunk in bytes.chunks(CHUNK_SIZE) {
                buffer.extend_from_slice(chunk);
                progress.fraction(buffer.len() as u64, total);
            }
        }
        FileSource::Path(path) => {
            let mut handle = tokio::fs::File::open(path).await.map_err(|e| {
                error!(error = ?e, path = %path.display(), "Failed to open file");
                IngestError::from(e)
            })?;
            let total = handle.metadata().await.map(|m| m.len()).unwrap_or(file.size);
            let mut chunk = vec![0u8; CHUNK_SIZE];
            loop {
                let n = handle.read(&mut chunk).await?;
                if n == 0 {
                    break;
                }
                buffer.extend_from_slice(&chunk[..n]);
                progress.fraction(buffer.len() as u64, total);
            }
        }
    }
    debug!(bytes = buffer.len(), "Read text file");
    Ok(decode_utf8(buffer, &file.name))
}

/// Decodes `bytes` as UTF-8; invalid sequences become U+FFFD and are logged.
fn decode_utf8(bytes: Vec<u8>, name: &str) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| {
        warn!(
            file = %name,
            valid_up_to = e.utf8_error().valid_up_to(),
            "File is not valid UTF-8, replacing invalid bytes"
        );
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    })
}
