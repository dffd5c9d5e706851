use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{NotesumError, Result};

/// Main configuration structure for Notesum
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Summarization engine configuration
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    /// Network provider configuration
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from an explicit path, or from the first default
    /// location that exists, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let default_paths = [
            dirs::home_dir().map(|h| h.join(".notesum").join("config.toml")),
            dirs::config_dir().map(|c| c.join("notesum").join("config.toml")),
            Some(PathBuf::from("config.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            NotesumError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content)
            .map_err(|e| NotesumError::Config(format!("Failed to parse config: {e}")))
    }
}

/// Summarization engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Target summary size used when a request does not specify one
    #[serde(default = "default_max_length")]
    pub default_max_length: usize,
    /// Minimum trimmed input length in characters
    #[serde(default = "default_min_input_chars")]
    pub min_input_chars: usize,
    /// Maximum trimmed input length in characters
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    /// Per-attempt timeout for network providers in milliseconds
    #[serde(default = "default_provider_timeout_ms")]
    pub provider_timeout_ms: u64,
    /// Retry policy for the primary provider
    #[serde(default)]
    pub retry: RetryConfig,
    /// Extractive fallback tuning
    #[serde(default)]
    pub extractive: ExtractiveConfig,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            default_max_length: default_max_length(),
            min_input_chars: default_min_input_chars(),
            max_input_chars: default_max_input_chars(),
            provider_timeout_ms: default_provider_timeout_ms(),
            retry: RetryConfig::default(),
            extractive: ExtractiveConfig::default(),
        }
    }
}

fn default_max_length() -> usize {
    150
}

fn default_min_input_chars() -> usize {
    50
}

fn default_max_input_chars() -> usize {
    50_000
}

fn default_provider_timeout_ms() -> u64 {
    30_000
}

/// Exponential backoff settings for provider calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt, doubled for each further attempt
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Upper bound for any single delay
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

/// Extractive fallback engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractiveConfig {
    /// Only the first N sentences are considered
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// Sentences shorter than this (in characters) are discarded
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,
    /// Score multiplier for the opening sentence
    #[serde(default = "default_first_sentence_bonus")]
    pub first_sentence_bonus: f64,
    /// Score multiplier for the closing sentence
    #[serde(default = "default_last_sentence_bonus")]
    pub last_sentence_bonus: f64,
}

impl Default for ExtractiveConfig {
    fn default() -> Self {
        Self {
            max_candidates: default_max_candidates(),
            min_sentence_chars: default_min_sentence_chars(),
            first_sentence_bonus: default_first_sentence_bonus(),
            last_sentence_bonus: default_last_sentence_bonus(),
        }
    }
}

fn default_max_candidates() -> usize {
    20
}

fn default_min_sentence_chars() -> usize {
    10
}

fn default_first_sentence_bonus() -> f64 {
    1.8
}

fn default_last_sentence_bonus() -> f64 {
    1.3
}

/// Network provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    /// OpenAI-compatible chat completions provider (preferred)
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Hugging Face inference provider
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL
    #[serde(default = "default_openai_api_url")]
    pub api_url: String,
    /// Environment variable name for API key
    #[serde(default = "default_openai_api_key_env")]
    pub api_key_env: String,
    /// Model identifier
    #[serde(default = "default_openai_model")]
    pub model: String,
    /// Sampling temperature
    #[serde(default = "default_openai_temperature")]
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_url: default_openai_api_url(),
            api_key_env: default_openai_api_key_env(),
            model: default_openai_model(),
            temperature: default_openai_temperature(),
        }
    }
}

fn default_openai_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_openai_temperature() -> f32 {
    0.3
}

/// Hugging Face inference provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuggingFaceConfig {
    /// Inference API base URL
    #[serde(default = "default_huggingface_api_url")]
    pub api_url: String,
    /// Environment variable name for API key
    #[serde(default = "default_huggingface_api_key_env")]
    pub api_key_env: String,
    /// Summarization model identifier
    #[serde(default = "default_huggingface_model")]
    pub model: String,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            api_url: default_huggingface_api_url(),
            api_key_env: default_huggingface_api_key_env(),
            model: default_huggingface_model(),
        }
    }
}

fn default_huggingface_api_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_huggingface_api_key_env() -> String {
    "HUGGINGFACE_API_KEY".to_string()
}

fn default_huggingface_model() -> String {
    "facebook/bart-large-cnn".to_string()
}

/// Returns the credential stored in `env_var` if it is set and non-empty
pub fn credential_from_env(env_var: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8787")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Whole-request timeout in seconds
    #[serde(default = "default_server_timeout_secs")]
    pub timeout_secs: u64,
    /// Environment variable holding the admin token; admin routes are
    /// disabled when it is unset
    #[serde(default = "default_admin_token_env")]
    pub admin_token_env: String,
    /// Per-requester quota
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Recent-summary cache
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            timeout_secs: default_server_timeout_secs(),
            admin_token_env: default_admin_token_env(),
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_server_timeout_secs() -> u64 {
    60
}

fn default_admin_token_env() -> String {
    "NOTESUM_ADMIN_TOKEN".to_string()
}

/// Sliding-window rate limit per requester
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Summarizations allowed per window
    #[serde(default = "default_rate_limit_max_requests")]
    pub max_requests: usize,
    /// Window length in seconds
    #[serde(default = "default_rate_limit_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_rate_limit_max_requests(),
            window_secs: default_rate_limit_window_secs(),
        }
    }
}

fn default_rate_limit_max_requests() -> usize {
    20
}

fn default_rate_limit_window_secs() -> u64 {
    3600
}

/// Recent-summary cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable the cache
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// How long a cached summary stays fresh
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum number of cached notes
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_secs: default_cache_ttl_secs(),
            max_entries: default_cache_max_entries(),
        }
    }
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_cache_max_entries() -> usize {
    1000
}
