//! Sliding-window rate limiting per requester

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;

use crate::config::RateLimitConfig;

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: usize },
    Limited { retry_after_secs: i64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

/// Tracks request timestamps per requester within a sliding window.
/// A `max_requests` of 0 disables limiting.
#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<String, VecDeque<DateTime<Utc>>>,
    max_requests: usize,
    window: TimeDelta,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let window = i64::try_from(config.window_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);

        Self {
            windows: DashMap::new(),
            max_requests: config.max_requests,
            window,
        }
    }

    /// Record a request from `requester` unless it is over quota
    pub fn check(&self, requester: &str) -> RateLimitDecision {
        self.check_at(requester, Utc::now())
    }

    pub fn check_at(&self, requester: &str, now: DateTime<Utc>) -> RateLimitDecision {
        if self.max_requests == 0 {
            return RateLimitDecision::Allowed {
                remaining: usize::MAX,
            };
        }

        if !self.windows.contains_key(requester) {
            self.prune_expired(now);
        }

        let mut window = self.windows.entry(requester.to_string()).or_default();
        self.expire(&mut window, now);

        if window.len() >= self.max_requests {
            let retry_after_secs = window
                .front()
                .and_then(|oldest| oldest.checked_add_signed(self.window))
                .map(|reset| (reset - now).num_seconds().max(1))
                .unwrap_or(i64::MAX);
            return RateLimitDecision::Limited { retry_after_secs };
        }

        window.push_back(now);
        RateLimitDecision::Allowed {
            remaining: self.max_requests - window.len(),
        }
    }

    /// Drop requesters whose window holds no live requests
    pub fn prune_expired(&self, now: DateTime<Utc>) {
        self.windows.retain(|_, window| {
            self.expire(window, now);
            !window.is_empty()
        });
    }

    fn expire(&self, window: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>) {
        while window
            .front()
            .is_some_and(|oldest| now - *oldest >= self.window)
        {
            window.pop_front();
        }
    }

    /// Number of requesters with a tracked window
    pub fn tracked_requesters(&self) -> usize {
        self.windows.len()
    }
}
