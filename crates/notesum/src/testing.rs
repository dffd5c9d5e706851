//! Test utilities for notesum - scripted providers and fast configs
//!
//! This module provides utilities to keep tests fast and deterministic:
//! - A mock provider with scripted responses and a call counter
//! - A summarizer config with millisecond retry delays

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::config::{RetryConfig, SummarizerConfig};
use crate::summarizer::{ProviderKind, ResolvedOptions, SummarizerError, SummaryProvider};

/// Summarizer config with 1-5ms backoff and a 100ms provider timeout.
/// Use this instead of `SummarizerConfig::default()` when a test exercises retries.
pub fn test_summarizer_config() -> SummarizerConfig {
    SummarizerConfig {
        provider_timeout_ms: 100,
        retry: RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
        },
        ..SummarizerConfig::default()
    }
}

/// Provider that replays scripted responses, then repeats a default one.
/// Counts every call so tests can assert how often the provider was hit.
#[derive(Debug)]
pub struct MockProvider {
    kind: ProviderKind,
    script: Mutex<VecDeque<Result<String, SummarizerError>>>,
    default: Result<String, SummarizerError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Always answers with `summary`
    pub fn succeeding(kind: ProviderKind, summary: impl Into<String>) -> Self {
        Self::with_default(kind, Ok(summary.into()))
    }

    /// Always fails with `error`
    pub fn failing(kind: ProviderKind, error: SummarizerError) -> Self {
        Self::with_default(kind, Err(error))
    }

    fn with_default(kind: ProviderKind, default: Result<String, SummarizerError>) -> Self {
        Self {
            kind,
            script: Mutex::new(VecDeque::new()),
            default,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Serve `responses` in order before falling back to the default
    pub fn with_script(self, responses: Vec<Result<String, SummarizerError>>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            ..self
        }
    }

    /// Sleep before every answer
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<String, SummarizerError> {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script.pop_front().unwrap_or_else(|| self.default.clone())
    }
}

#[async_trait]
impl SummaryProvider for MockProvider {
    async fn summarize(
        &self,
        _text: &str,
        _options: &ResolvedOptions,
    ) -> Result<String, SummarizerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_response()
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::SummaryStyle;

    fn options() -> ResolvedOptions {
        ResolvedOptions {
            max_length: 100,
            style: SummaryStyle::Concise,
        }
    }

    #[tokio::test]
    async fn mock_replays_script_then_default() {
        let mock = MockProvider::succeeding(ProviderKind::OpenAi, "default")
            .with_script(vec![Err(SummarizerError::ProviderError("first".into()))]);

        assert!(mock.summarize("text", &options()).await.is_err());
        assert_eq!(mock.summarize("text", &options()).await.unwrap(), "default");
        assert_eq!(mock.summarize("text", &options()).await.unwrap(), "default");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn mock_reports_configured_kind() {
        let mock = MockProvider::failing(
            ProviderKind::HuggingFace,
            SummarizerError::ProviderError("down".into()),
        );
        assert_eq!(mock.kind(), ProviderKind::HuggingFace);
        assert_eq!(mock.name(), "huggingface");
    }

    #[test]
    fn fast_config_keeps_defaults_elsewhere() {
        let config = test_summarizer_config();
        assert_eq!(config.retry.base_delay_ms, 1);
        assert_eq!(config.min_input_chars, SummarizerConfig::default().min_input_chars);
    }
}
