// Reviewer/auditor evaluation loop.
// All completion calls go through llm_client::CompletionBackend.

pub mod evaluator;
pub mod prompts;
pub mod score;
pub mod state;

pub use evaluator::{EvaluationConfig, Evaluator};
pub use score::extract_score;
pub use state::AuditStatus;
