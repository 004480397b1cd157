use std::path::Path;

use tracing::debug;

use crate::errors::ExtractionError;

/// Reads the embedded text layer of a PDF, one entry per page.
pub trait PdfTextSource: Send + Sync {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ExtractionError>;
}

/// `pdf-extract` backed text source.
pub struct PdfExtractSource;

impl PdfTextSource for PdfExtractSource {
    fn page_texts(&self, path: &Path) -> Result<Vec<String>, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractionError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        // pdf-extract panics on some malformed files; treat that like any parse error
        let pages = std::panic::catch_unwind(|| {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })
        .map_err(|_| ExtractionError::Pdf("pdf-extract panicked while parsing".to_string()))?
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;

        debug!("Direct extraction read {} pages from {:?}", pages.len(), path);
        Ok(pages)
    }
}
