use std::path::PathBuf;

use thiserror::Error;

use crate::llm_client::LlmError;

/// Failures while turning one PDF into text.
/// The orchestrator logs these and skips the file.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF read error for {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF parse error: {0}")]
    Pdf(String),

    #[error("Could not count pages: {0}")]
    PageCount(String),

    #[error("Rasterization failed on page {page}: {message}")]
    Rasterize { page: u32, message: String },

    #[error("OCR failed on page {page}: {message}")]
    Ocr { page: u32, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reading or appending the CSV stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed id '{value}' in {path}")]
    MalformedId { path: PathBuf, value: String },
}

impl<W> From<csv::IntoInnerError<W>> for StoreError {
    fn from(e: csv::IntoInnerError<W>) -> Self {
        StoreError::Io(e.into_error())
    }
}

/// Which side of the reviewer/auditor exchange failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationStep {
    Reviewer,
    Auditor,
}

impl std::fmt::Display for EvaluationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationStep::Reviewer => f.write_str("reviewer"),
            EvaluationStep::Auditor => f.write_str("auditor"),
        }
    }
}

/// A completion-service failure inside the evaluation loop.
/// Never caught by the loop itself; the orchestrator skips the resume.
#[derive(Debug, Error)]
#[error("{step} step failed on round {round}: {source}")]
pub struct EvaluationError {
    pub step: EvaluationStep,
    pub round: u32,
    #[source]
    pub source: LlmError,
}
