// Text extraction: direct PDF text first, per-page OCR when the text layer is too thin.
// Collaborators sit behind traits so the fallback rule is testable without poppler/tesseract.

pub mod extractor;
pub mod ocr;
pub mod pdf;

pub use extractor::TextExtractor;
pub use ocr::{OcrEngine, PageRasterizer, PdftoppmRasterizer, TesseractCli};
pub use pdf::{PdfExtractSource, PdfTextSource};
