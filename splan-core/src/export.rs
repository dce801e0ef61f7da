//! Writing generated documents to disk as markdown or PDF.

use crate::document::StudyDocument;
use crate::error::ExportError;
use crate::markdown_to_pdf::render_pdf;
use crate::session::StudyMaterials;
use crate::settings::ToolType;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// File name of the summary + flashcards + quiz export.
pub const COMBINED_FILE_NAME: &str = "study-materials.pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Markdown,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// `<tool>-<YYYY-MM-DD>.<ext>`
pub fn file_name(tool: ToolType, format: ExportFormat, date: NaiveDate) -> String {
    format!("{}-{}.{}", tool.as_str(), date.format("%Y-%m-%d"), format.extension())
}

/// [`file_name`] for today's local date.
pub fn default_file_name(tool: ToolType, format: ExportFormat) -> String {
    file_name(tool, format, Local::now().date_naive())
}

/// The bytes that would be written for `document`.
pub fn render(document: &StudyDocument, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let markdown = document.to_markdown();
    match format {
        ExportFormat::Markdown => Ok(markdown.into_bytes()),
        ExportFormat::Pdf => render_pdf(document.tool().as_str(), &[markdown.as_str()]),
    }
}

/// Writes `document` to `target`. A directory target gets the default file name.
pub async fn write_document(
    document: &StudyDocument,
    format: ExportFormat,
    target: &Path,
) -> Result<PathBuf, ExportError> {
    let path = resolve_target(target, || default_file_name(document.tool(), format)).await;
    let bytes = render(document, format)?;
    write_bytes(&path, &bytes).await?;
    info!(path = %path.display(), tool = %document.tool(), ?format, "Exported document");
    Ok(path)
}

/// Writes the three documents as one PDF, each on its own pages.
pub async fn write_combined(materials: &StudyMaterials, target: &Path) -> Result<PathBuf, ExportError> {
    let path = resolve_target(target, || COMBINED_FILE_NAME.to_string()).await;
    let sections: Vec<String> = materials.sections().iter().map(|d| d.to_markdown()).collect();
    let sections: Vec<&str> = sections.iter().map(String::as_str).collect();
    let bytes = render_pdf("Study Materials", &sections)?;
    write_bytes(&path, &bytes).await?;
    info!(path = %path.display(), "Exported combined study materials");
    Ok(path)
}

async fn resolve_target(target: &Path, name: impl FnOnce() -> String) -> PathBuf {
    match tokio::fs::metadata(target).await {
        Ok(meta) if meta.is_dir() => target.join(name()),
        _ => target.to_path_buf(),
    }
}

async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            error!(error = ?e, dir = %parent.display(), "Failed to create export directory");
            ExportError::Io(e)
        })?;
    }
    tokio::fs::write(path, bytes).await.map_err(|e| {
        error!(error = ?e, path = %path.display(), "Failed to write export");
        ExportError::Io(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Summary;

    #[test]
    fn names_carry_tool_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(file_name(ToolType::Quiz, ExportFormat::Pdf, date), "quiz-2024-03-09.pdf");
        assert_eq!(
            file_name(ToolType::Summarize, ExportFormat::Markdown, date),
            "summarize-2024-03-09.md"
        );
    }

    #[tokio::test]
    async fn directory_target_gets_default_name() {
        let dir = tempfile::tempdir().unwrap();
        let doc = StudyDocument::Summary(Summary {
            points: vec!["Water boils at one hundred degrees".into()],
        });
        let path = write_document(&doc, ExportFormat::Markdown, dir.path()).await.unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("summarize-") && name.ends_with(".md"), "{name}");
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, doc.to_markdown());
    }
}
