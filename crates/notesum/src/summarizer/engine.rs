//! Summarization orchestrator
//!
//! Validates input, calls the provider selected at construction with retry,
//! timeout and output validation, and degrades through the extractive
//! engine to plain truncation so valid input always gets a summary.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::{Config, SummarizerConfig, credential_from_env};
use crate::summarizer::extractive::ExtractiveSummarizer;
use crate::summarizer::huggingface::HuggingFaceProvider;
use crate::summarizer::openai::OpenAiProvider;
use crate::summarizer::provider::SummaryProvider;
use crate::summarizer::retry::{RetryPolicy, retry};
use crate::summarizer::stats::{ProviderStats, StatsCollector};
use crate::summarizer::truncate::simple_truncate;
use crate::summarizer::types::{
    ProviderKind, ResolvedOptions, SummarizationResult, SummarizeOptions, SummarizerError,
    SummaryStyle,
};
use crate::summarizer::validation::{InputLimits, validate_input, validate_summary};

/// Text sent to network providers by `health_check`
const HEALTH_CHECK_TEXT: &str = "This is a short health check note. It confirms that the summarization provider is reachable and answering requests.";

/// Health of the active provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub provider: ProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    fn healthy(provider: ProviderKind) -> Self {
        Self {
            status: HealthStatus::Healthy,
            provider,
            error: None,
        }
    }

    fn unhealthy(provider: ProviderKind, error: String) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            provider,
            error: Some(error),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Pick the provider for this process: OpenAI if its key is set, else
/// Hugging Face if its key is set, else the local extractive engine
pub fn select_provider(config: &Config) -> Arc<dyn SummaryProvider> {
    let timeout = Duration::from_millis(config.summarizer.provider_timeout_ms);

    if credential_from_env(&config.providers.openai.api_key_env).is_some() {
        match OpenAiProvider::new(&config.providers.openai, timeout) {
            Ok(provider) => {
                info!("Selected summarization provider: openai");
                return Arc::new(provider);
            }
            Err(e) => warn!("OpenAI credential present but provider unusable: {}", e),
        }
    }

    if credential_from_env(&config.providers.huggingface.api_key_env).is_some() {
        match HuggingFaceProvider::new(&config.providers.huggingface, timeout) {
            Ok(provider) => {
                info!("Selected summarization provider: huggingface");
                return Arc::new(provider);
            }
            Err(e) => warn!("Hugging Face credential present but provider unusable: {}", e),
        }
    }

    info!("No provider credentials configured, using local extractive summarizer");
    Arc::new(ExtractiveSummarizer::new(config.summarizer.extractive.clone()))
}

/// Summarization entry point
///
/// Holds one provider for its whole lifetime; failures never demote it.
pub struct Summarizer {
    primary: Arc<dyn SummaryProvider>,
    fallback: ExtractiveSummarizer,
    stats: Arc<StatsCollector>,
    retry_policy: RetryPolicy,
    limits: InputLimits,
    default_max_length: usize,
    provider_timeout: Duration,
}

impl Summarizer {
    /// Build from configuration, selecting the provider from the
    /// credentials present in the environment
    pub fn from_config(config: &Config) -> Self {
        Self::with_provider(&config.summarizer, select_provider(config))
    }

    /// Build around an explicit provider
    pub fn with_provider(config: &SummarizerConfig, primary: Arc<dyn SummaryProvider>) -> Self {
        Self {
            primary,
            fallback: ExtractiveSummarizer::new(config.extractive.clone()),
            stats: Arc::new(StatsCollector::new()),
            retry_policy: RetryPolicy::from(&config.retry),
            limits: InputLimits {
                min_chars: config.min_input_chars,
                max_chars: config.max_input_chars,
            },
            default_max_length: config.default_max_length.max(1),
            provider_timeout: Duration::from_millis(config.provider_timeout_ms),
        }
    }

    /// Share a counter set with other components
    pub fn with_stats(mut self, stats: Arc<StatsCollector>) -> Self {
        self.stats = stats;
        self
    }

    pub fn current_provider(&self) -> ProviderKind {
        self.primary.kind()
    }

    pub fn stats(&self) -> ProviderStats {
        self.stats.snapshot(self.current_provider())
    }

    pub fn default_max_length(&self) -> usize {
        self.default_max_length
    }

    /// Longest the primary tier can take before the fallback chain runs:
    /// every attempt timing out plus every backoff delay
    pub fn worst_case_latency(&self) -> Duration {
        self.provider_timeout
            .saturating_mul(self.retry_policy.max_attempts)
            .saturating_add(self.retry_policy.total_backoff())
    }

    /// Summarize `text`
    ///
    /// Only `InvalidInput` is returned as an error; provider failures are
    /// absorbed by the fallback chain and visible only in `provider`.
    pub async fn summarize(
        &self,
        text: &str,
        options: &SummarizeOptions,
    ) -> Result<SummarizationResult, SummarizerError> {
        self.stats.record_request();

        let text = validate_input(text, &self.limits)?;
        let original_length = text.chars().count();
        let resolved = self.resolve(options);
        let kind = self.primary.kind();

        debug!(
            requester = options.requester_id.as_deref().unwrap_or("anonymous"),
            provider = kind.as_str(),
            original_length,
            max_length = resolved.max_length,
            style = resolved.style.as_str(),
            "Summarization requested"
        );

        if kind.is_network() {
            match self.call_primary(text, &resolved, original_length).await {
                Ok(summary) => {
                    return Ok(SummarizationResult::new(summary, kind, original_length));
                }
                Err(e) => {
                    self.stats.record_error();
                    warn!(
                        "Provider {} failed after retries, using extractive fallback: {}",
                        kind, e
                    );
                }
            }
            return self.extractive_or_truncate(text, &resolved, original_length);
        }

        match self.primary.summarize(text, &resolved).await {
            Ok(summary) => Ok(SummarizationResult::new(summary, kind, original_length)),
            Err(e) => {
                self.stats.record_error();
                warn!("Provider {} failed, truncating instead: {}", kind, e);
                self.truncate(text, &resolved, original_length)
            }
        }
    }

    /// Probe the active provider
    ///
    /// Only network providers are actually called; the local engine is
    /// always healthy.
    pub async fn health_check(&self) -> HealthReport {
        let kind = self.primary.kind();
        if !kind.is_network() {
            return HealthReport::healthy(kind);
        }

        let probe = ResolvedOptions {
            max_length: 30,
            style: SummaryStyle::Concise,
        };

        match tokio::time::timeout(
            self.provider_timeout,
            self.primary.summarize(HEALTH_CHECK_TEXT, &probe),
        )
        .await
        {
            Ok(Ok(_)) => HealthReport::healthy(kind),
            Ok(Err(e)) => {
                warn!("Health check against {} failed: {}", kind, e);
                HealthReport::unhealthy(kind, e.to_string())
            }
            Err(_) => HealthReport::unhealthy(
                kind,
                format!("No response within {:?}", self.provider_timeout),
            ),
        }
    }

    fn resolve(&self, options: &SummarizeOptions) -> ResolvedOptions {
        ResolvedOptions {
            max_length: options
                .max_length
                .filter(|n| *n > 0)
                .unwrap_or(self.default_max_length),
            style: options.style,
        }
    }

    /// One provider call per attempt, each bounded by the provider timeout
    /// and followed by output validation
    async fn call_primary(
        &self,
        text: &str,
        options: &ResolvedOptions,
        original_length: usize,
    ) -> Result<String, SummarizerError> {
        let provider = &self.primary;
        let timeout = self.provider_timeout;

        retry(&self.retry_policy, provider.name(), |attempt| async move {
            debug!("Calling {} (attempt {})", provider.name(), attempt);

            let summary = tokio::time::timeout(timeout, provider.summarize(text, options))
                .await
                .map_err(|_| {
                    SummarizerError::ProviderTimeout(format!(
                        "{} did not respond within {:?}",
                        provider.name(),
                        timeout
                    ))
                })??;

            validate_summary(&summary, original_length)?;
            Ok(summary.trim().to_string())
        })
        .await
    }

    fn extractive_or_truncate(
        &self,
        text: &str,
        options: &ResolvedOptions,
        original_length: usize,
    ) -> Result<SummarizationResult, SummarizerError> {
        match self.fallback.summarize_text(text, options) {
            Ok(summary) => Ok(SummarizationResult::new(
                summary,
                ProviderKind::Fallback,
                original_length,
            )),
            Err(e) => {
                warn!("Extractive fallback failed, truncating instead: {}", e);
                self.truncate(text, options, original_length)
            }
        }
    }

    fn truncate(
        &self,
        text: &str,
        options: &ResolvedOptions,
        original_length: usize,
    ) -> Result<SummarizationResult, SummarizerError> {
        let summary = simple_truncate(text, options.max_length);
        if summary.is_empty() {
            error!("Every summarization tier came back empty");
            return Err(SummarizerError::ProviderUnavailable(
                "No summarization tier produced output".to_string(),
            ));
        }
        Ok(SummarizationResult::new(
            summary,
            ProviderKind::Simple,
            original_length,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockProvider, test_summarizer_config};

    const NOTE: &str = "The quarterly planning meeting covered hiring, budget and the roadmap. The team agreed that the important priority is shipping the mobile app by March. However, the budget for contractors was cut by 15 percent. Next steps are to update the roadmap and share it with stakeholders.";

    fn summarizer(provider: MockProvider) -> (Summarizer, Arc<MockProvider>) {
        let provider = Arc::new(provider);
        let summarizer = Summarizer::with_provider(&test_summarizer_config(), provider.clone());
        (summarizer, provider)
    }

    #[tokio::test]
    async fn test_short_input_rejected_without_provider_call() {
        let (summarizer, provider) =
            summarizer(MockProvider::succeeding(ProviderKind::OpenAi, "unused summary"));

        let err = summarizer
            .summarize("Too short to summarize.", &SummarizeOptions::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SummarizerError::InvalidInput(_)));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_network_success() {
        let (summarizer, provider) = summarizer(MockProvider::succeeding(
            ProviderKind::OpenAi,
            "  Planning covered hiring, budget and a March mobile launch.  ",
        ));

        let result = summarizer
            .summarize(NOTE, &SummarizeOptions::new().with_requester("user-1"))
            .await
            .unwrap();

        assert_eq!(result.provider, ProviderKind::OpenAi);
        assert_eq!(
            result.summary,
            "Planning covered hiring, budget and a March mobile launch."
        );
        assert_eq!(result.word_count, 9);
        assert_eq!(result.original_length, NOTE.chars().count());
        assert_eq!(provider.call_count(), 1);
        assert_eq!(summarizer.stats().error_count, 0);
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let (summarizer, provider) = summarizer(
            MockProvider::succeeding(ProviderKind::HuggingFace, "Hiring, budget cuts and a March launch.")
                .with_script(vec![
                    Err(SummarizerError::ProviderError("503".into())),
                    Err(SummarizerError::ProviderTimeout("slow".into())),
                ]),
        );

        let result = summarizer.summarize(NOTE, &SummarizeOptions::new()).await.unwrap();

        assert_eq!(result.provider, ProviderKind::HuggingFace);
        assert_eq!(provider.call_count(), 3);
        assert_eq!(summarizer.stats().error_count, 0);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fall_back_to_extractive() {
        let (summarizer, provider) = summarizer(MockProvider::failing(
            ProviderKind::OpenAi,
            SummarizerError::ProviderError("500".into()),
        ));

        let result = summarizer.summarize(NOTE, &SummarizeOptions::new()).await.unwrap();

        assert_eq!(result.provider, ProviderKind::Fallback);
        assert!(!result.summary.is_empty());
        assert_eq!(provider.call_count(), 3);

        let stats = summarizer.stats();
        assert_eq!(stats.request_count, 1);
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.current_provider, ProviderKind::OpenAi);
    }

    #[tokio::test]
    async fn test_refusal_response_triggers_fallback() {
        let (summarizer, _) = summarizer(MockProvider::succeeding(
            ProviderKind::OpenAi,
            "I'm sorry, but I cannot summarize this content.",
        ));

        let result = summarizer.summarize(NOTE, &SummarizeOptions::new()).await.unwrap();
        assert_eq!(result.provider, ProviderKind::Fallback);
    }

    #[tokio::test]
    async fn test_overlong_response_triggers_fallback() {
        let (summarizer, _) =
            summarizer(MockProvider::succeeding(ProviderKind::OpenAi, NOTE.repeat(2)));

        let result = summarizer.summarize(NOTE, &SummarizeOptions::new()).await.unwrap();
        assert_eq!(result.provider, ProviderKind::Fallback);
    }

    #[tokio::test]
    async fn test_timeout_triggers_fallback() {
        let (summarizer, provider) = summarizer(
            MockProvider::succeeding(ProviderKind::OpenAi, "A valid but very late summary.")
                .with_delay(Duration::from_millis(500)),
        );

        let result = summarizer.summarize(NOTE, &SummarizeOptions::new()).await.unwrap();
        assert_eq!(result.provider, ProviderKind::Fallback);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_local_provider_failure_goes_straight_to_truncation() {
        let (summarizer, provider) = summarizer(MockProvider::failing(
            ProviderKind::Fallback,
            SummarizerError::FallbackError("boom".into()),
        ));

        let result = summarizer.summarize(NOTE, &SummarizeOptions::new()).await.unwrap();

        assert_eq!(result.provider, ProviderKind::Simple);
        assert!(!result.summary.is_empty());
        assert_eq!(provider.call_count(), 1);
        assert_eq!(summarizer.stats().error_count, 1);
    }

    #[tokio::test]
    async fn test_default_max_length_applies() {
        let (summarizer, _) = summarizer(MockProvider::failing(
            ProviderKind::Fallback,
            SummarizerError::FallbackError("boom".into()),
        ));

        let zero = summarizer
            .summarize(NOTE, &SummarizeOptions::new().with_max_length(0))
            .await
            .unwrap();
        let default = summarizer.summarize(NOTE, &SummarizeOptions::new()).await.unwrap();
        assert_eq!(zero.summary, default.summary);
    }

    #[test]
    fn test_worst_case_latency() {
        let default = Summarizer::with_provider(
            &SummarizerConfig::default(),
            Arc::new(MockProvider::succeeding(ProviderKind::OpenAi, "unused")),
        );
        assert_eq!(default.worst_case_latency(), Duration::from_secs(93));

        let (fast, _) = summarizer(MockProvider::succeeding(ProviderKind::OpenAi, "unused"));
        assert_eq!(fast.worst_case_latency(), Duration::from_millis(300 + 1 + 2));
    }

    #[tokio::test]
    async fn test_health_check_local_is_trivially_healthy() {
        let (summarizer, provider) = summarizer(MockProvider::failing(
            ProviderKind::Fallback,
            SummarizerError::FallbackError("boom".into()),
        ));

        let report = summarizer.health_check().await;
        assert!(report.is_healthy());
        assert_eq!(report.provider, ProviderKind::Fallback);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_health_check_network_failure() {
        let (summarizer, provider) = summarizer(MockProvider::failing(
            ProviderKind::OpenAi,
            SummarizerError::ProviderError("API returned 401 Unauthorized".into()),
        ));

        let report = summarizer.health_check().await;
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert!(report.error.unwrap().contains("401"));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_health_check_network_success() {
        let (summarizer, _) = summarizer(MockProvider::succeeding(
            ProviderKind::HuggingFace,
            "Health check confirmed.",
        ));

        let report = summarizer.health_check().await;
        assert!(report.is_healthy());
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn test_shared_stats_collector() {
        let stats = Arc::new(StatsCollector::new());
        let provider = Arc::new(MockProvider::succeeding(
            ProviderKind::OpenAi,
            "Hiring, budget cuts and a March launch.",
        ));
        let first = Summarizer::with_provider(&test_summarizer_config(), provider.clone())
            .with_stats(stats.clone());
        let second =
            Summarizer::with_provider(&test_summarizer_config(), provider).with_stats(stats.clone());

        first.summarize(NOTE, &SummarizeOptions::new()).await.unwrap();
        second.summarize(NOTE, &SummarizeOptions::new()).await.unwrap();

        assert_eq!(stats.request_count(), 2);
    }

    #[test]
    fn test_select_provider_without_credentials() {
        let mut config = Config::default();
        config.providers.openai.api_key_env = "NOTESUM_ENGINE_TEST_NO_OPENAI".to_string();
        config.providers.huggingface.api_key_env = "NOTESUM_ENGINE_TEST_NO_HF".to_string();
        unsafe {
            std::env::remove_var("NOTESUM_ENGINE_TEST_NO_OPENAI");
            std::env::remove_var("NOTESUM_ENGINE_TEST_NO_HF");
        }

        let summarizer = Summarizer::from_config(&config);
        assert_eq!(summarizer.current_provider(), ProviderKind::Fallback);
    }

    #[test]
    fn test_select_provider_prefers_openai() {
        let mut config = Config::default();
        config.providers.openai.api_key_env = "NOTESUM_ENGINE_TEST_OPENAI".to_string();
        config.providers.huggingface.api_key_env = "NOTESUM_ENGINE_TEST_HF".to_string();
        unsafe {
            std::env::set_var("NOTESUM_ENGINE_TEST_OPENAI", "sk-test");
            std::env::set_var("NOTESUM_ENGINE_TEST_HF", "hf-test");
        }

        assert_eq!(select_provider(&config).kind(), ProviderKind::OpenAi);
    }

    #[test]
    fn test_select_provider_huggingface_when_only_hf_key() {
        let mut config = Config::default();
        config.providers.openai.api_key_env = "NOTESUM_ENGINE_TEST_ONLY_HF_OPENAI".to_string();
        config.providers.huggingface.api_key_env = "NOTESUM_ENGINE_TEST_ONLY_HF".to_string();
        unsafe {
            std::env::remove_var("NOTESUM_ENGINE_TEST_ONLY_HF_OPENAI");
            std::env::set_var("NOTESUM_ENGINE_TEST_ONLY_HF", "hf-test");
        }

        assert_eq!(select_provider(&config).kind(), ProviderKind::HuggingFace);
    }

    #[test]
    fn test_health_report_serialization() {
        let report = HealthReport::unhealthy(ProviderKind::OpenAi, "timeout".to_string());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["provider"], "openai");
        assert_eq!(json["error"], "timeout");

        let json = serde_json::to_value(HealthReport::healthy(ProviderKind::Fallback)).unwrap();
        assert!(json.get("error").is_none());
    }
}
