//! Hugging Face inference API summarization provider
//!
//! Calls a hosted summarization model (`POST {api_url}/models/{model}`).
//! The model only produces prose, so bullet and detailed styles are applied
//! to its output locally.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::{HuggingFaceConfig, credential_from_env};
use crate::summarizer::extractive::apply_style;
use crate::summarizer::openai::map_transport_error;
use crate::summarizer::provider::SummaryProvider;
use crate::summarizer::types::{ProviderKind, ResolvedOptions, SummarizerError};

/// Summarizer backed by the Hugging Face inference API
#[derive(Debug)]
pub struct HuggingFaceProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

/// The API answers either a list of summaries or an error object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Summaries(Vec<SummaryOutput>),
    Error { error: String },
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

impl HuggingFaceProvider {
    /// Create a provider reading the API key from `config.api_key_env`
    pub fn new(config: &HuggingFaceConfig, timeout: Duration) -> Result<Self, SummarizerError> {
        let api_key = credential_from_env(&config.api_key_env).ok_or_else(|| {
            SummarizerError::ConfigError(format!(
                "API key env var '{}' not set",
                config.api_key_env
            ))
        })?;
        Self::with_api_key(config, api_key, timeout)
    }

    /// Create a provider with an explicit API key
    pub fn with_api_key(
        config: &HuggingFaceConfig,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, SummarizerError> {
        let base = Url::parse(&config.api_url).map_err(|e| {
            SummarizerError::ConfigError(format!(
                "Invalid Hugging Face api_url '{}': {e}",
                config.api_url
            ))
        })?;
        let endpoint = format!(
            "{}/models/{}",
            base.as_str().trim_end_matches('/'),
            config.model
        );

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SummarizerError::ConfigError(e.to_string()))?;

        info!("HuggingFaceProvider initialized with model: {}", config.model);

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl SummaryProvider for HuggingFaceProvider {
    async fn summarize(
        &self,
        text: &str,
        options: &ResolvedOptions,
    ) -> Result<String, SummarizerError> {
        let request = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                max_length: options.max_length,
                min_length: (options.max_length / 3).max(5),
                do_sample: false,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };
        debug!("Calling Hugging Face inference API at: {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| map_transport_error(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SummarizerError::ProviderError(format!(
                "API returned {status}: {error_text}"
            )));
        }

        let parsed: InferenceResponse = response.json().await.map_err(|e| {
            SummarizerError::ProviderError(format!("Failed to parse inference response: {e}"))
        })?;

        let summary = match parsed {
            InferenceResponse::Summaries(outputs) => outputs
                .into_iter()
                .next()
                .map(|o| o.summary_text.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| SummarizerError::ProviderError("Empty response".to_string()))?,
            InferenceResponse::Error { error } => {
                return Err(SummarizerError::ProviderError(error));
            }
        };

        Ok(apply_style(&summary, options.style))
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }
}
