use std::str::FromStr;

use anyhow::{Context, Result};

/// Pipeline configuration loaded from environment variables.
/// The API key is optional here; `require_api_key` makes it fatal for the
/// commands that talk to the completion service.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub llm_max_attempts: u32,
    pub eval_language: String,
    pub ocr_languages: String,
    pub tesseract_path: String,
    pub pdftoppm_path: String,
    pub pdfinfo_path: String,
    pub min_direct_text_chars: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            llm_model: env_or("LLM_MODEL", crate::llm_client::DEFAULT_MODEL),
            llm_max_tokens: parse_env("LLM_MAX_TOKENS", 4096)?,
            llm_max_attempts: parse_env("LLM_MAX_ATTEMPTS", 1)?,
            eval_language: env_or("EVAL_LANGUAGE", "Thai"),
            ocr_languages: env_or("OCR_LANGUAGES", "tha+eng"),
            tesseract_path: env_or("TESSERACT_PATH", "tesseract"),
            pdftoppm_path: env_or("PDFTOPPM_PATH", "pdftoppm"),
            pdfinfo_path: env_or("PDFINFO_PATH", "pdfinfo"),
            min_direct_text_chars: parse_env("MIN_DIRECT_TEXT_CHARS", 50)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// Returns the completion-service key or fails before any work starts.
    pub fn require_api_key(&self) -> Result<&str> {
        self.anthropic_api_key
            .as_deref()
            .context("Required environment variable 'ANTHROPIC_API_KEY' is not set")
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_api_key_fails_when_missing() {
        let config = Config {
            anthropic_api_key: None,
            llm_model: "m".to_string(),
            llm_max_tokens: 1,
            llm_max_attempts: 1,
            eval_language: "English".to_string(),
            ocr_languages: "eng".to_string(),
            tesseract_path: "tesseract".to_string(),
            pdftoppm_path: "pdftoppm".to_string(),
            pdfinfo_path: "pdfinfo".to_string(),
            min_direct_text_chars: 50,
            rust_log: "info".to_string(),
        };
        let err = config.require_api_key().unwrap_err();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_parse_env_uses_default_for_unset_key() {
        let value: u32 = parse_env("SCREENER_TEST_UNSET_NUMERIC_KEY", 7).unwrap();
        assert_eq!(value, 7);
    }
}
