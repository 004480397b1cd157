//! Evaluation loop: bounded reviewer/auditor exchange for one resume.
//!
//! Flow: reviewer → auditor → next_step() → (reviewer again | finish).
//! Each step makes exactly one completion call. Errors are not caught here.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::{EvaluationError, EvaluationStep};
use crate::evaluation::prompts::{
    fill_template, AUDITOR_PROMPT_TEMPLATE, AUDITOR_SYSTEM, FEEDBACK_HEADER,
    REVIEWER_PROMPT_TEMPLATE, REVIEWER_SYSTEM_TEMPLATE,
};
use crate::evaluation::state::{next_step, AuditStatus, EvaluationState, Step};
use crate::llm_client::CompletionBackend;

/// Max reviewer turns per resume.
pub const MAX_REVIEWS: u32 = 3;

#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    pub max_reviews: u32,
    /// Language the reviewer writes its evaluation in.
    pub language: String,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            max_reviews: MAX_REVIEWS,
            language: "English".to_string(),
        }
    }
}

/// Terminal result of one evaluation.
#[derive(Debug, Clone)]
pub struct EvaluationOutcome {
    pub state: EvaluationState,
    /// True when the loop stopped on the review cap rather than an auditor PASS.
    /// The status is then best-effort, not an approval.
    pub exhausted: bool,
}

impl EvaluationOutcome {
    pub fn status(&self) -> AuditStatus {
        self.state.status
    }

    pub fn evaluation_text(&self) -> &str {
        &self.state.reviewer_output
    }
}

pub struct Evaluator {
    backend: Arc<dyn CompletionBackend>,
    config: EvaluationConfig,
    reviewer_system: String,
}

impl Evaluator {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: EvaluationConfig) -> Self {
        let reviewer_system =
            fill_template(REVIEWER_SYSTEM_TEMPLATE, &[("language", config.language.as_str())]);
        Self {
            backend,
            config,
            reviewer_system,
        }
    }

    /// Runs the loop to completion for one resume.
    pub async fn evaluate(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<EvaluationOutcome, EvaluationError> {
        let mut state = EvaluationState::new(resume_text, job_description);
        // A zero cap would never reach an auditor turn.
        let max_reviews = self.config.max_reviews.max(1);

        loop {
            self.review(&mut state).await?;
            self.audit(&mut state).await?;

            if next_step(state.status, state.retry_count, max_reviews) == Step::Finish {
                break;
            }
            info!(
                "Auditor rejected round {}/{}, sending feedback to reviewer",
                state.retry_count, max_reviews
            );
        }

        let exhausted = state.status != AuditStatus::Pass;
        if exhausted {
            warn!(
                "Review cap of {} reached without auditor PASS; keeping last evaluation",
                max_reviews
            );
        }

        Ok(EvaluationOutcome { state, exhausted })
    }

    async fn review(&self, state: &mut EvaluationState) -> Result<(), EvaluationError> {
        let prompt = build_reviewer_prompt(state);
        let output = self
            .backend
            .complete(&self.reviewer_system, &prompt)
            .await
            .map_err(|source| EvaluationError {
                step: EvaluationStep::Reviewer,
                round: state.retry_count + 1,
                source,
            })?;
        state.record_review(output);
        Ok(())
    }

    async fn audit(&self, state: &mut EvaluationState) -> Result<(), EvaluationError> {
        let prompt = build_auditor_prompt(state);
        let reply = self
            .backend
            .complete(AUDITOR_SYSTEM, &prompt)
            .await
            .map_err(|source| EvaluationError {
                step: EvaluationStep::Auditor,
                round: state.retry_count,
                source,
            })?;
        debug!("Auditor reply on round {}: {}", state.retry_count, reply.trim());
        state.record_audit(reply);
        Ok(())
    }
}

/// Reviewer prompt: JD, resume, and every prior rejection labeled by round.
fn build_reviewer_prompt(state: &EvaluationState) -> String {
    let feedback_section = if state.feedback_history.is_empty() {
        String::new()
    } else {
        let rounds = state
            .feedback_history
            .iter()
            .enumerate()
            .map(|(i, feedback)| format!("Round {}: {}", i + 1, feedback.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        format!("\n{FEEDBACK_HEADER}\n{rounds}\n")
    };

    fill_template(
        REVIEWER_PROMPT_TEMPLATE,
        &[
            ("job_description", state.job_description.as_str()),
            ("resume_text", state.resume_text.as_str()),
            ("feedback_section", feedback_section.as_str()),
        ],
    )
}

fn build_auditor_prompt(state: &EvaluationState) -> String {
    fill_template(
        AUDITOR_PROMPT_TEMPLATE,
        &[
            ("job_description", state.job_description.as_str()),
            ("resume_text", state.resume_text.as_str()),
            ("reviewer_output", state.reviewer_output.as_str()),
        ],
    )
}
