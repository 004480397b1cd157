use serde::{Deserialize, Serialize};

/// Auditor verdict carried through the loop. `Start` only exists before the
/// first auditor turn; a finished loop always holds `Pass` or `Fail`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    #[default]
    Start,
    Pass,
    Fail,
}

impl AuditStatus {
    /// PASS only for a reply that is exactly "PASS" once trimmed, in any case.
    pub fn from_auditor_reply(reply: &str) -> Self {
        if reply.trim().to_uppercase() == "PASS" {
            AuditStatus::Pass
        } else {
            AuditStatus::Fail
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Start => "START",
            AuditStatus::Pass => "PASS",
            AuditStatus::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Working state for one resume's evaluation. Discarded once the loop exits.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationState {
    pub resume_text: String,
    pub job_description: String,
    pub reviewer_output: String,
    /// Raw auditor rejections, oldest first.
    pub feedback_history: Vec<String>,
    pub status: AuditStatus,
    /// Reviewer turns taken so far.
    pub retry_count: u32,
}

impl EvaluationState {
    pub fn new(resume_text: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            resume_text: resume_text.into(),
            job_description: job_description.into(),
            reviewer_output: String::new(),
            feedback_history: Vec::new(),
            status: AuditStatus::Start,
            retry_count: 0,
        }
    }

    pub fn record_review(&mut self, output: String) {
        self.reviewer_output = output;
        self.retry_count += 1;
    }

    pub fn record_audit(&mut self, reply: String) {
        self.status = AuditStatus::from_auditor_reply(&reply);
        if self.status == AuditStatus::Fail {
            self.feedback_history.push(reply);
        }
    }
}

/// What the loop does after an auditor turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Review,
    Finish,
}

/// Transition after each auditor turn.
pub fn next_step(status: AuditStatus, retry_count: u32, max_reviews: u32) -> Step {
    if status == AuditStatus::Pass || retry_count >= max_reviews {
        Step::Finish
    } else {
        Step::Review
    }
}
