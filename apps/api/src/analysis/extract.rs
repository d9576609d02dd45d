//! Raw text extraction from uploaded CV documents.

use std::path::Path;

use tracing::info;

use crate::errors::AnalysisError;

/// Extraction refuses anything shorter than this; a real CV is never a
/// couple of lines.
pub const MIN_CV_TEXT_LEN: usize = 50;

/// Extracts raw text from a CV document on disk.
///
/// PDF is extracted via `pdf-extract`; plain text and markdown pass
/// through. Anything else is an unsupported format.
pub fn extract_text(path: &Path) -> Result<String, AnalysisError> {
    if !path.exists() {
        return Err(AnalysisError::CvParsing(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => pdf_extract::extract_text(path).map_err(|e| {
            AnalysisError::CvParsing(format!("Failed to extract text from PDF: {e}"))
        })?,
        "txt" | "md" | "text" => std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::CvParsing(format!("Failed to read file: {e}"))
        })?,
        other => {
            return Err(AnalysisError::CvParsing(format!(
                "Unsupported file format: .{other} (supported: .pdf, .txt, .md)"
            )))
        }
    };

    validate_cv_text(&text)?;
    info!("Extracted {} characters from {}", text.len(), path.display());
    Ok(text)
}

/// Rejects empty or too-short CV text, wherever it came from.
pub fn validate_cv_text(text: &str) -> Result<(), AnalysisError> {
    if text.trim().len() < MIN_CV_TEXT_LEN {
        return Err(AnalysisError::CvParsing(
            "CV appears to be empty or too short".to_string(),
        ));
    }
    Ok(())
}
