use once_cell::sync::Lazy;
use regex::Regex;

/// Stored when no score can be scraped from the evaluation.
pub const NO_SCORE: &str = "N/A";

/// `Score` or Thai `คะแนน`, an optional parenthesised range such as `(0-10)`,
/// optional colon and markdown emphasis, then the number.
static SCORE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:score|คะแนน)[*_\s]*(?:\([^)\n]*\))?[*_\s]*[:：]?[*_\s]*(\d+(?:\.\d+)?)")
        .expect("score pattern is a valid regex")
});

/// First score number in `evaluation`, or `"N/A"`.
pub fn extract_score(evaluation: &str) -> String {
    SCORE_PATTERN
        .captures(evaluation)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| NO_SCORE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_with_range_label() {
        assert_eq!(extract_score("Score (0-10): 7.5"), "7.5");
    }

    #[test]
    fn test_no_label_is_na() {
        assert_eq!(
            extract_score("Strong Rust background, recommend interview."),
            NO_SCORE
        );
    }

    #[test]
    fn test_markdown_bold_label() {
        assert_eq!(extract_score("**Score:** 8/10\nStrengths: ..."), "8");
    }

    #[test]
    fn test_thai_label() {
        assert_eq!(extract_score("คะแนน: 6 เต็ม 10"), "6");
    }

    #[test]
    fn test_first_match_wins() {
        let text = "Overall score: 4\nRevised score: 9";
        assert_eq!(extract_score(text), "4");
    }

    #[test]
    fn test_lowercase_label() {
        assert_eq!(extract_score("fit score 3"), "3");
    }

    #[test]
    fn test_label_without_number_is_na() {
        assert_eq!(extract_score("Score: pending further review"), NO_SCORE);
    }
}
