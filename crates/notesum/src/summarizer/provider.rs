//! Summary provider trait
//!
//! Defines the SummaryProvider trait that abstracts the interchangeable
//! summarization backends (network APIs and the local extractive engine).

use async_trait::async_trait;

use crate::summarizer::types::{ProviderKind, ResolvedOptions, SummarizerError};

/// Trait for summarization backends
///
/// The orchestrator holds exactly one selected provider for its lifetime and
/// wraps its calls in retry, timeout and validation.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Summarize `text` (already trimmed and length-checked)
    ///
    /// Returns the raw summary text; the caller validates it.
    async fn summarize(
        &self,
        text: &str,
        options: &ResolvedOptions,
    ) -> Result<String, SummarizerError>;

    /// Which tier this provider represents
    fn kind(&self) -> ProviderKind;

    /// Provider name for logging
    fn name(&self) -> &'static str {
        self.kind().as_str()
    }
}
