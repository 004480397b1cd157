//! Orchestrator: extraction stage, then evaluation stage.
//!
//! Both stages are sequential and skip individual failures: one bad PDF or one
//! failed completion call is logged and the batch moves on.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::evaluation::{extract_score, Evaluator};
use crate::extraction::TextExtractor;
use crate::store::{ResumeStore, VerdictRecord, VerdictStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub found: usize,
    pub already_recorded: usize,
    pub extracted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationSummary {
    pub evaluated: usize,
    pub passed: usize,
    pub exhausted: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Sorted `*.pdf` files directly under `dir`. Creates `dir` when missing.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        info!("Directory {:?} not found, creating it", dir);
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {dir:?}"))?;
    }

    let mut pdfs: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {dir:?}"))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_pdf(path))
        .collect();
    pdfs.sort();
    Ok(pdfs)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Extracts every PDF not yet in `store`, appending one row per success.
/// Store errors are fatal; extraction errors skip the file.
pub fn run_extraction(
    pdfs: &[PathBuf],
    extractor: &TextExtractor,
    store: &ResumeStore,
) -> Result<ExtractionSummary> {
    let known = store
        .known_filenames()
        .with_context(|| format!("Failed to read resume store {:?}", store.path()))?;

    let mut summary = ExtractionSummary {
        found: pdfs.len(),
        ..ExtractionSummary::default()
    };

    for path in pdfs {
        let name = file_name(path);
        if known.contains(&name) {
            summary.already_recorded += 1;
            continue;
        }

        info!("Extracting {}", name);
        let text = match extractor.extract(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                summary.failed += 1;
                continue;
            }
        };

        let id = store.next_id()?;
        store
            .append(id, &name, &text)
            .with_context(|| format!("Failed to append {name} to {:?}", store.path()))?;
        info!("Recorded {} as id {} ({} chars)", name, id, text.chars().count());
        summary.extracted += 1;
    }

    Ok(summary)
}

/// Reads the job description, rejecting a blank file.
pub fn load_job_description(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job description {path:?}"))?;
    if text.trim().is_empty() {
        anyhow::bail!("Job description {path:?} is empty");
    }
    Ok(text)
}

/// Evaluates every recorded resume and appends a verdict per success.
/// Ids already in `verdicts` are skipped unless `reevaluate` is set.
pub async fn run_evaluation(
    evaluator: &Evaluator,
    resumes: &ResumeStore,
    verdicts: &VerdictStore,
    job_description: &str,
    reevaluate: bool,
) -> Result<EvaluationSummary> {
    let records = resumes
        .load_all()
        .with_context(|| format!("Failed to read resume store {:?}", resumes.path()))?;
    let done = if reevaluate {
        Default::default()
    } else {
        verdicts
            .evaluated_ids()
            .with_context(|| format!("Failed to read verdict store {:?}", verdicts.path()))?
    };

    let mut summary = EvaluationSummary::default();

    for record in records {
        if done.contains(&record.id) {
            summary.skipped += 1;
            continue;
        }

        info!("Evaluating {} (id {})", record.filename, record.id);
        let outcome = match evaluator.evaluate(&record.text, job_description).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Evaluation of {} (id {}) failed: {}", record.filename, record.id, e);
                summary.failed += 1;
                continue;
            }
        };

        let verdict = VerdictRecord {
            id: record.id,
            filename: record.filename,
            score: extract_score(outcome.evaluation_text()),
            status: outcome.status(),
            evaluation_text: outcome.evaluation_text().to_string(),
        };
        verdicts
            .append(&verdict)
            .with_context(|| format!("Failed to append verdict to {:?}", verdicts.path()))?;

        info!(
            "Verdict for {} (id {}): score={} status={} rounds={}",
            verdict.filename, verdict.id, verdict.score, verdict.status, outcome.state.retry_count
        );
        summary.evaluated += 1;
        if outcome.exhausted {
            summary.exhausted += 1;
        } else {
            summary.passed += 1;
        }
    }

    Ok(summary)
}
