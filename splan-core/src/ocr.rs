//! OCR through the `tesseract` executable.

use crate::contract::{CollaboratorError, OcrEngine};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// Runs `tesseract <image> stdout -l <lang>` for each image.
///
/// The binary and language are checked on first use and the result is kept
/// for the lifetime of the engine, so one engine should serve a whole session.
pub struct TesseractOcr {
    binary: PathBuf,
    language: String,
    ready: OnceCell<String>,
}

impl TesseractOcr {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
            ready: OnceCell::new(),
        }
    }

    /// Whether the engine has already been initialized.
    pub fn is_initialized(&self) -> bool {
        self.ready.initialized()
    }

    async fn initialize(&self) -> Result<&String, CollaboratorError> {
        self.ready
            .get_or_try_init(|| async {
                let output = Command::new(&self.binary)
                    .arg("--list-langs")
                    .output()
                    .await
                    .map_err(|e| {
                        error!(error = ?e, binary = %self.binary.display(), "Failed to launch tesseract");
                        format!("OCR engine unavailable ({}): {e}", self.binary.display())
                    })?;
                // Older tesseract builds print the language list on stderr.
                let listing = format!(
                    "{}{}",
                    String::from_utf8_lossy(&output.stdout),
                    String::from_utf8_lossy(&output.stderr)
                );
                if !languages_installed(&listing, &self.language) {
                    error!(language = %self.language, "Tesseract language data not installed");
                    return Err(CollaboratorError::from(format!(
                        "OCR language '{}' is not installed",
                        self.language
                    )));
                }
                info!(binary = %self.binary.display(), language = %self.language, "OCR engine initialised");
                Ok::<String, CollaboratorError>(self.language.clone())
            })
            .await
    }
}

/// Whether every part of a `-l` argument such as `eng+deu` appears in the
/// `--list-langs` output.
fn languages_installed(listing: &str, language: &str) -> bool {
    let installed: Vec<&str> = listing.lines().map(str::trim).collect();
    language
        .split('+')
        .map(str::trim)
        .all(|lang| !lang.is_empty() && installed.contains(&lang))
}

fn suffix_for(media_type: &str) -> &'static str {
    match media_type {
        "image/png" => ".png",
        "image/jpeg" | "image/jpg" => ".jpg",
        "image/gif" => ".gif",
        "image/bmp" => ".bmp",
        "image/tiff" => ".tiff",
        "image/webp" => ".webp",
        _ => ".img",
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image: Vec<u8>, media_type: String) -> Result<String, CollaboratorError> {
        let language = self.initialize().await?;

        let file = tempfile::Builder::new()
            .prefix("splan-ocr-")
            .suffix(suffix_for(&media_type))
            .tempfile()?;
        tokio::fs::write(file.path(), &image).await?;
        debug!(path = %file.path().display(), bytes = image.len(), "Running tesseract");

        let output = Command::new(&self.binary)
            .arg(file.path())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(status = ?output.status, %stderr, "Tesseract exited with an error");
            return Err(format!("tesseract failed: {}", stderr.trim()).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "List of available languages in \"/usr/share/tessdata/\" (3):\neng\ndeu\nosd\n";

    #[test]
    fn combined_languages_need_every_part_installed() {
        assert!(languages_installed(LISTING, "eng"));
        assert!(languages_installed(LISTING, "eng+deu"));
        assert!(!languages_installed(LISTING, "eng+fra"));
        assert!(!languages_installed(LISTING, "eng+"));
        assert!(!languages_installed(LISTING, ""));
    }

    #[tokio::test]
    async fn missing_binary_is_reported_and_not_cached() {
        let ocr = TesseractOcr::new("/nonexistent/splan-tesseract", "eng");
        let result = ocr.recognize(vec![0u8; 8], "image/png".to_string()).await;
        assert!(result.is_err());
        assert!(!ocr.is_initialized());
    }
}
