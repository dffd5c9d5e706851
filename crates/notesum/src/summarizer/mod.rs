//! Summarizer module
//!
//! Turns note text into a short summary. A network provider is used when a
//! credential is configured; the extractive engine and plain truncation
//! cover every failure below it.

pub mod engine;
pub mod extractive;
pub mod huggingface;
pub mod openai;
pub mod prompts;
pub mod provider;
pub mod retry;
pub mod stats;
pub mod truncate;
pub mod types;
pub mod validation;

pub use engine::{HealthReport, HealthStatus, Summarizer, select_provider};
pub use extractive::{ExtractiveSummarizer, ScoredSentence, apply_style, split_sentences};
pub use huggingface::HuggingFaceProvider;
pub use openai::OpenAiProvider;
pub use provider::SummaryProvider;
pub use retry::{RetryPolicy, retry};
pub use stats::{ProviderStats, StatsCollector};
pub use truncate::simple_truncate;
pub use types::{
    ProviderKind, ResolvedOptions, SummarizationResult, SummarizeOptions, SummarizerError,
    SummaryStyle,
};
pub use validation::{InputLimits, validate_input, validate_summary};
