//! Text extractor: turns one PDF into a single string.
//!
//! Flow: direct page text → if the trimmed result is under the threshold,
//!       rasterize each page at 2x and OCR it instead. A PDF whose text
//!       layer cannot be parsed at all goes straight to OCR, with the page
//!       count taken from the rasterizer.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::errors::ExtractionError;
use crate::extraction::ocr::{OcrEngine, PageRasterizer};
use crate::extraction::pdf::PdfTextSource;

/// Linear render scale for OCR (2x of 72 DPI = 144 DPI).
pub const OCR_RENDER_SCALE: f32 = 2.0;
pub const DEFAULT_MIN_DIRECT_TEXT_CHARS: usize = 50;

pub struct TextExtractor {
    pdf: Box<dyn PdfTextSource>,
    rasterizer: Box<dyn PageRasterizer>,
    ocr: Box<dyn OcrEngine>,
    min_direct_chars: usize,
}

impl TextExtractor {
    pub fn new(
        pdf: Box<dyn PdfTextSource>,
        rasterizer: Box<dyn PageRasterizer>,
        ocr: Box<dyn OcrEngine>,
    ) -> Self {
        Self {
            pdf,
            rasterizer,
            ocr,
            min_direct_chars: DEFAULT_MIN_DIRECT_TEXT_CHARS,
        }
    }

    pub fn with_min_direct_chars(mut self, min_direct_chars: usize) -> Self {
        self.min_direct_chars = min_direct_chars;
        self
    }

    /// Extracts text from `path`, falling back to OCR when the text layer is too thin.
    pub fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let pages = match self.pdf.page_texts(path) {
            Ok(pages) => pages,
            Err(ExtractionError::Pdf(reason)) => {
                let count = self.rasterizer.page_count(path)?;
                warn!(
                    "Text layer of {:?} unreadable ({}), running OCR on {} pages",
                    path, reason, count
                );
                return self.ocr_pages(path, count);
            }
            Err(e) => return Err(e),
        };
        let direct = pages.join("\n");

        if !needs_ocr(&direct, self.min_direct_chars) {
            debug!("Using direct text for {:?} ({} pages)", path, pages.len());
            return Ok(direct);
        }

        info!(
            "Direct text for {:?} under {} chars, running OCR on {} pages",
            path,
            self.min_direct_chars,
            pages.len()
        );

        self.ocr_pages(path, pages.len() as u32)
    }

    fn ocr_pages(&self, path: &Path, count: u32) -> Result<String, ExtractionError> {
        let mut ocr_pages = Vec::with_capacity(count as usize);
        for page in 1..=count {
            ocr_pages.push(self.ocr_page(path, page)?);
        }
        Ok(ocr_pages.join("\n"))
    }

    /// OCRs one page. The raster lives in a temp dir that is removed on return,
    /// whether or not rasterization and recognition succeed.
    fn ocr_page(&self, path: &Path, page: u32) -> Result<String, ExtractionError> {
        let scratch = tempfile::Builder::new()
            .prefix("screener-page-")
            .tempdir()?;

        let image = self
            .rasterizer
            .rasterize(path, page, OCR_RENDER_SCALE, scratch.path())?;
        let lines = self.ocr.recognize(&image, page)?;

        Ok(lines.join(" "))
    }
}

/// True when the trimmed direct text has fewer than `min_chars` characters.
pub fn needs_ocr(direct_text: &str, min_chars: usize) -> bool {
    direct_text.trim().chars().count() < min_chars
}
