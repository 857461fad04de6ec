//! Text extraction from source documents.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{RagError, Result};

/// Pulls raw text out of a document on disk.
///
/// Extraction is blocking; the pipeline runs it on the blocking thread pool.
pub trait TextExtractor: Send + Sync {
    /// Extract all text from the document at `path`.
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Extracts text from PDF files with `lopdf`, one page at a time.
///
/// Page texts are concatenated in page order. A page whose text cannot be
/// decoded contributes nothing; only a file that cannot be parsed at all is
/// an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let document = lopdf::Document::load(path).map_err(|e| RagError::ExtractionError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let pages = document.get_pages();
        let mut text = String::new();
        for page_number in pages.keys() {
            match document.extract_text(&[*page_number]) {
                Ok(page_text) => text.push_str(&page_text),
                Err(e) => {
                    warn!(path = %path.display(), page = page_number, error = %e, "skipping page")
                }
            }
        }

        debug!(path = %path.display(), pages = pages.len(), chars = text.len(), "extracted text");
        Ok(text)
    }
}
