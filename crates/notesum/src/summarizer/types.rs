//! Summarizer types
//!
//! Defines the request options, results, provider identifiers and errors
//! shared by the orchestrator, the provider adapters and the fallbacks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output shape requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStyle {
    /// Plain prose, no decoration
    #[default]
    Concise,
    /// One bullet per line
    Bullet,
    /// Prose prefixed with a "Summary:" label
    Detailed,
}

impl SummaryStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStyle::Concise => "concise",
            SummaryStyle::Bullet => "bullet",
            SummaryStyle::Detailed => "detailed",
        }
    }
}

impl fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryStyle {
    type Err = SummarizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "concise" => Ok(SummaryStyle::Concise),
            "bullet" | "bullets" => Ok(SummaryStyle::Bullet),
            "detailed" => Ok(SummaryStyle::Detailed),
            other => Err(SummarizerError::InvalidInput(format!(
                "Unknown summary style '{other}'"
            ))),
        }
    }
}

/// Per-call options for `Summarizer::summarize`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarizeOptions {
    /// Target summary size in a token-like unit; the configured default
    /// applies when absent
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Output style
    #[serde(default)]
    pub style: SummaryStyle,
    /// Who asked, for logging only
    #[serde(default)]
    pub requester_id: Option<String>,
}

impl SummarizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_style(mut self, style: SummaryStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_requester(mut self, requester_id: impl Into<String>) -> Self {
        self.requester_id = Some(requester_id.into());
        self
    }
}

/// Options with every default resolved, handed to providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub max_length: usize,
    pub style: SummaryStyle,
}

/// Which tier of the fallback chain produced a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions API
    OpenAi,
    /// Hugging Face inference API
    HuggingFace,
    /// Local extractive engine
    Fallback,
    /// Last-resort truncation
    Simple,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::HuggingFace => "huggingface",
            ProviderKind::Fallback => "fallback",
            ProviderKind::Simple => "simple",
        }
    }

    /// True for paid providers reached over the network
    pub fn is_network(&self) -> bool {
        matches!(self, ProviderKind::OpenAi | ProviderKind::HuggingFace)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A produced summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizationResult {
    pub summary: String,
    pub provider: ProviderKind,
    /// Whitespace-separated words in `summary`
    pub word_count: usize,
    /// Character length of the trimmed input
    pub original_length: usize,
}

impl SummarizationResult {
    pub fn new(summary: String, provider: ProviderKind, original_length: usize) -> Self {
        let word_count = summary.split_whitespace().count();
        Self {
            summary,
            provider,
            word_count,
            original_length,
        }
    }
}

/// Summarizer-specific errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SummarizerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Provider timed out: {0}")]
    ProviderTimeout(String),
    #[error("Fallback failed: {0}")]
    FallbackError(String),
    #[error("No provider available: {0}")]
    ProviderUnavailable(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SummarizerError {
    /// Whether another attempt against the same provider may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SummarizerError::ProviderError(_) | SummarizerError::ProviderTimeout(_)
        )
    }
}
