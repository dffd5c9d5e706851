//! Input bounds and provider-output checks

use crate::summarizer::types::SummarizerError;

/// Shortest provider output accepted as a summary, in characters
pub const MIN_SUMMARY_CHARS: usize = 10;

/// Openings that mark an apology, refusal or self-description rather than
/// a summary of the note
const REFUSAL_PREFIXES: &[&str] = &[
    "i'm sorry",
    "i am sorry",
    "sorry,",
    "i apologize",
    "i apologise",
    "i cannot",
    "i can't",
    "i can not",
    "i'm unable",
    "i am unable",
    "unfortunately, i",
    "as an ai",
    "as a language model",
    "as an artificial intelligence",
    "i'm an ai",
    "i am an ai",
];

/// Openings that mark an error artifact; must be followed by a non-letter
const ERROR_PREFIXES: &[&str] = &["error", "failed", "exception"];

/// Character-length bounds for note text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLimits {
    pub min_chars: usize,
    pub max_chars: usize,
}

/// Check `text` against `limits` and return it trimmed
pub fn validate_input<'a>(text: &'a str, limits: &InputLimits) -> Result<&'a str, SummarizerError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SummarizerError::InvalidInput(
            "Text is required and must be a non-empty string".to_string(),
        ));
    }

    let length = trimmed.chars().count();
    if length < limits.min_chars {
        return Err(SummarizerError::InvalidInput(format!(
            "Text is too short for meaningful summarization ({length} characters, minimum {})",
            limits.min_chars
        )));
    }
    if length > limits.max_chars {
        return Err(SummarizerError::InvalidInput(format!(
            "Text is too long ({length} characters, maximum {})",
            limits.max_chars
        )));
    }

    Ok(trimmed)
}

/// Reject provider output that cannot be a summary of a note of
/// `original_length` characters
pub fn validate_summary(summary: &str, original_length: usize) -> Result<(), SummarizerError> {
    let summary = summary.trim();
    let length = summary.chars().count();

    if length < MIN_SUMMARY_CHARS {
        return Err(SummarizerError::ProviderError(format!(
            "Summary too short ({length} characters)"
        )));
    }
    if length > original_length {
        return Err(SummarizerError::ProviderError(format!(
            "Summary longer than input ({length} > {original_length} characters)"
        )));
    }
    if is_failure_phrase(summary) {
        return Err(SummarizerError::ProviderError(format!(
            "Provider returned a non-summary response: {}",
            summary.chars().take(60).collect::<String>()
        )));
    }

    Ok(())
}

/// True if `text` opens with an apology, refusal, AI self-reference or an
/// error label
pub fn is_failure_phrase(text: &str) -> bool {
    let lower = text.trim_start().to_lowercase().replace('\u{2019}', "'");

    if REFUSAL_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return true;
    }

    ERROR_PREFIXES.iter().any(|p| {
        lower.starts_with(p)
            && lower[p.len()..]
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphabetic())
    })
}
