//! OCR fallback collaborators: `pdfinfo` counts pages, `pdftoppm` renders one
//! page to PNG, `tesseract` reads it back as text lines.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::errors::ExtractionError;

/// Renders a single PDF page to an image file inside `out_dir`.
/// `page` is 1-based; `scale` is linear, relative to 72 DPI.
pub trait PageRasterizer: Send + Sync {
    /// Page count as seen by the renderer. Used when the text layer cannot be parsed.
    fn page_count(&self, pdf: &Path) -> Result<u32, ExtractionError>;

    fn rasterize(
        &self,
        pdf: &Path,
        page: u32,
        scale: f32,
        out_dir: &Path,
    ) -> Result<PathBuf, ExtractionError>;
}

/// Recognizes text in an image, returning lines in reading order.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &Path, page: u32) -> Result<Vec<String>, ExtractionError>;
}

pub struct PdftoppmRasterizer {
    binary: String,
    pdfinfo: String,
}

impl PdftoppmRasterizer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            pdfinfo: "pdfinfo".to_string(),
        }
    }

    pub fn with_pdfinfo(mut self, pdfinfo: impl Into<String>) -> Self {
        self.pdfinfo = pdfinfo.into();
        self
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn page_count(&self, pdf: &Path) -> Result<u32, ExtractionError> {
        let output = Command::new(&self.pdfinfo)
            .arg(pdf)
            .output()
            .map_err(|e| {
                ExtractionError::PageCount(format!("failed to run {}: {e}", self.pdfinfo))
            })?;

        if !output.status.success() {
            return Err(ExtractionError::PageCount(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        parse_page_count(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            ExtractionError::PageCount(format!("{} printed no Pages line", self.pdfinfo))
        })
    }

    fn rasterize(
        &self,
        pdf: &Path,
        page: u32,
        scale: f32,
        out_dir: &Path,
    ) -> Result<PathBuf, ExtractionError> {
        let dpi = (72.0 * scale).round() as u32;
        let prefix = out_dir.join(format!("page-{page}"));
        let page_arg = page.to_string();

        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-singlefile")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(&page_arg)
            .arg("-l")
            .arg(&page_arg)
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|e| ExtractionError::Rasterize {
                page,
                message: format!("failed to run {}: {e}", self.binary),
            })?;

        if !output.status.success() {
            return Err(ExtractionError::Rasterize {
                page,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let image = prefix.with_extension("png");
        if !image.exists() {
            return Err(ExtractionError::Rasterize {
                page,
                message: format!("{} produced no image", self.binary),
            });
        }

        debug!("Rasterized page {} at {} DPI", page, dpi);
        Ok(image)
    }
}

pub struct TesseractCli {
    binary: String,
    languages: String,
}

impl TesseractCli {
    pub fn new(binary: impl Into<String>, languages: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            languages: languages.into(),
        }
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &Path, page: u32) -> Result<Vec<String>, ExtractionError> {
        let output = Command::new(&self.binary)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .output()
            .map_err(|e| ExtractionError::Ocr {
                page,
                message: format!("failed to run {}: {e}", self.binary),
            })?;

        if !output.status.success() {
            return Err(ExtractionError::Ocr {
                page,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            warn!("Tesseract warning on page {}: {}", page, stderr.trim());
        }

        Ok(recognized_lines(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// `Pages:` value from `pdfinfo` output.
fn parse_page_count(stdout: &str) -> Option<u32> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|count| count.trim().parse().ok())
}

/// Non-blank, trimmed lines of tesseract output.
fn recognized_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_lines_drops_blank_lines() {
        let raw = "Jane Doe\n\n  Rust Engineer  \n\x0c";
        assert_eq!(recognized_lines(raw), vec!["Jane Doe", "Rust Engineer"]);
    }

    #[test]
    fn test_parse_page_count_reads_pages_line() {
        let raw = "Title:          CV\nProducer:       Scanner 3000\n\
                   Pages:          4\nEncrypted:      no\n";
        assert_eq!(parse_page_count(raw), Some(4));
        assert_eq!(parse_page_count("Title: CV\n"), None);
        assert_eq!(parse_page_count("Pages: many\n"), None);
    }

    #[test]
    fn test_missing_pdfinfo_binary_is_page_count_error() {
        let rasterizer =
            PdftoppmRasterizer::new("pdftoppm").with_pdfinfo("screener-no-such-pdfinfo");
        let err = rasterizer.page_count(Path::new("resume.pdf")).unwrap_err();
        assert!(matches!(err, ExtractionError::PageCount(_)));
    }

    #[test]
    fn test_missing_rasterizer_binary_is_rasterize_error() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = PdftoppmRasterizer::new("screener-no-such-pdftoppm");
        let err = rasterizer
            .rasterize(Path::new("resume.pdf"), 1, 2.0, dir.path())
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Rasterize { page: 1, .. }));
    }

    #[test]
    fn test_missing_ocr_binary_is_ocr_error() {
        let engine = TesseractCli::new("screener-no-such-tesseract", "eng");
        let err = engine.recognize(Path::new("page.png"), 3).unwrap_err();
        assert!(matches!(err, ExtractionError::Ocr { page: 3, .. }));
    }
}
