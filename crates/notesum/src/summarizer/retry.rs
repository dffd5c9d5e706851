//! Retry with exponential backoff
//!
//! `RetryPolicy` decides how many attempts a fallible operation gets and how
//! long to wait between them; `retry` drives any async operation with it.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::config::RetryConfig;
use crate::summarizer::types::SummarizerError;

/// Attempt budget and backoff curve
///
/// Attempt 1 runs immediately; the delay after failed attempt `n` is
/// `min(base * 2^(n-1), max)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Sum of every backoff delay when all attempts fail
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .map(|attempt| self.backoff(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Delay to wait after failed attempt `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }
}

/// Run `operation` until it succeeds, a non-retryable error occurs, or the
/// attempt budget is spent. Returns the last error on failure.
///
/// `operation` receives the 1-based attempt number.
pub async fn retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, SummarizerError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, SummarizerError>>,
{
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !e.is_retryable() || attempt >= policy.max_attempts {
                    warn!(
                        "{} failed on attempt {}/{}, giving up: {}",
                        label, attempt, policy.max_attempts, e
                    );
                    return Err(e);
                }

                let delay = policy.backoff(attempt);
                warn!(
                    "{} failed on attempt {}/{}, retrying in {:?}: {}",
                    label, attempt, policy.max_attempts, delay, e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
