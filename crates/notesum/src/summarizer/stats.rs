//! Request accounting for the summarizer
//!
//! Counters live in a `StatsCollector` that is shared by `Arc`, so every
//! `Summarizer` can be given its own (tests) or a process-wide one.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::summarizer::types::ProviderKind;

/// Lock-free request/error counters
#[derive(Debug, Default)]
pub struct StatsCollector {
    requests: AtomicU64,
    errors: AtomicU64,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Point-in-time view tagged with the active provider
    pub fn snapshot(&self, current_provider: ProviderKind) -> ProviderStats {
        ProviderStats::new(self.request_count(), self.error_count(), current_provider)
    }
}

/// Snapshot returned by `Summarizer::stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub request_count: u64,
    pub error_count: u64,
    /// Percentage of requests whose primary provider did not fail,
    /// rounded to two decimals; 0 before the first request
    pub success_rate: f64,
    pub current_provider: ProviderKind,
}

impl ProviderStats {
    pub fn new(request_count: u64, error_count: u64, current_provider: ProviderKind) -> Self {
        let success_rate = if request_count == 0 {
            0.0
        } else {
            let ok = request_count.saturating_sub(error_count) as f64;
            (ok / request_count as f64 * 10_000.0).round() / 100.0
        };

        Self {
            request_count,
            error_count,
            success_rate,
            current_provider,
        }
    }
}
