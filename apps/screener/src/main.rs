mod config;
mod errors;
mod evaluation;
mod extraction;
mod llm_client;
mod pipeline;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::evaluation::{EvaluationConfig, Evaluator};
use crate::extraction::{PdfExtractSource, PdftoppmRasterizer, TesseractCli, TextExtractor};
use crate::llm_client::{LlmClient, LlmSettings};
use crate::store::{ResumeStore, VerdictStore};

#[derive(Parser)]
#[command(name = "screener", version, about = "Extract PDF resumes and score them against a job description")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    paths: Paths,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Extract pending resumes, then evaluate (default)
    Run,
    /// Only extract text from pending PDFs
    Extract,
    /// Only evaluate resumes already in the OCR store
    Evaluate,
}

#[derive(Args, Clone)]
struct Paths {
    /// Directory holding the PDF resumes
    #[arg(long, global = true, default_value = "resumes")]
    resume_dir: PathBuf,

    /// Extracted-text store
    #[arg(long, global = true, default_value = "ocr_results.csv")]
    ocr_csv: PathBuf,

    /// Verdict store
    #[arg(long, global = true, default_value = "judge_results.csv")]
    verdict_csv: PathBuf,

    /// Job description text file
    #[arg(long, global = true, default_value = "job_description.txt")]
    job_description: PathBuf,

    /// Evaluate resumes that already have a verdict row
    #[arg(long, global = true)]
    reevaluate: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    let cli = Cli::parse();

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screener v{}", env!("CARGO_PKG_VERSION"));

    let command = cli.command.unwrap_or(Command::Run);
    let paths = cli.paths;

    // Missing credentials must stop us before any file is touched
    let evaluator = match command {
        Command::Run | Command::Evaluate => Some(build_evaluator(&config)?),
        Command::Extract => None,
    };

    let resumes = ResumeStore::new(&paths.ocr_csv);

    if matches!(command, Command::Run | Command::Extract) {
        info!("=== STEP 1: TEXT EXTRACTION ===");
        let pdfs = pipeline::list_pdfs(&paths.resume_dir)?;
        if pdfs.is_empty() {
            info!("No PDF files found in {:?}", paths.resume_dir);
        } else {
            let extractor = build_extractor(&config);
            let summary = pipeline::run_extraction(&pdfs, &extractor, &resumes)?;
            info!(
                "Extraction complete: {} found, {} already recorded, {} extracted, {} failed",
                summary.found, summary.already_recorded, summary.extracted, summary.failed
            );
        }
    }

    let Some(evaluator) = evaluator else {
        return Ok(());
    };

    if !resumes.exists() {
        info!(
            "No resumes to evaluate and no existing {:?}. Stopping.",
            paths.ocr_csv
        );
        return Ok(());
    }

    info!("=== STEP 2: AI EVALUATION ===");
    let job_description = pipeline::load_job_description(&paths.job_description)?;
    let verdicts = VerdictStore::new(&paths.verdict_csv);
    let summary = pipeline::run_evaluation(
        &evaluator,
        &resumes,
        &verdicts,
        &job_description,
        paths.reevaluate,
    )
    .await?;

    info!(
        "Evaluation complete: {} evaluated ({} passed audit, {} hit review cap), {} failed, {} skipped",
        summary.evaluated, summary.passed, summary.exhausted, summary.failed, summary.skipped
    );
    info!("Results written to {:?}", verdicts.path());

    Ok(())
}

fn build_extractor(config: &Config) -> TextExtractor {
    TextExtractor::new(
        Box::new(PdfExtractSource),
        Box::new(
            PdftoppmRasterizer::new(&config.pdftoppm_path).with_pdfinfo(&config.pdfinfo_path),
        ),
        Box::new(TesseractCli::new(&config.tesseract_path, &config.ocr_languages)),
    )
    .with_min_direct_chars(config.min_direct_text_chars)
}

fn build_evaluator(config: &Config) -> Result<Evaluator> {
    let llm = LlmClient::new(LlmSettings {
        api_key: config.require_api_key()?.to_string(),
        model: config.llm_model.clone(),
        max_tokens: config.llm_max_tokens,
        max_attempts: config.llm_max_attempts,
    })?;
    info!("LLM client initialized (model: {})", llm.model());

    Ok(Evaluator::new(
        Arc::new(llm),
        EvaluationConfig {
            language: config.eval_language.clone(),
            ..EvaluationConfig::default()
        },
    ))
}
