//! Per-note summary cache
//!
//! Keyed by note id. An entry only answers a lookup while the note text is
//! unchanged (same fingerprint) and younger than the configured TTL.

use chrono::{DateTime, TimeDelta, Utc};
use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use tokio::sync::Mutex as TokioMutex;

use crate::config::CacheConfig;
use crate::server::handlers::SummarizeResponse;

/// Default capacity when the configured one is 0
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
struct CacheEntry {
    fingerprint: u64,
    response: SummarizeResponse,
}

/// LRU cache of summaries by note id
#[derive(Debug)]
pub struct SummaryCache {
    entries: TokioMutex<LruCache<String, CacheEntry>>,
    ttl: TimeDelta,
    enabled: bool,
}

impl SummaryCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cap = NonZeroUsize::new(config.max_entries)
            .or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        let ttl = i64::try_from(config.ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);

        Self {
            entries: TokioMutex::new(LruCache::new(cap)),
            ttl,
            enabled: config.enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cached summary for `note_id` if `text` is unchanged and the entry is fresh
    pub async fn get(&self, note_id: &str, text: &str) -> Option<SummarizeResponse> {
        self.get_at(note_id, text, Utc::now()).await
    }

    pub async fn get_at(
        &self,
        note_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Option<SummarizeResponse> {
        if !self.enabled {
            return None;
        }

        let mut entries = self.entries.lock().await;
        let entry = entries.get(note_id)?;

        if now - entry.response.summarized_at >= self.ttl {
            entries.pop(note_id);
            return None;
        }
        if entry.fingerprint != fingerprint(text) {
            return None;
        }

        Some(entry.response.clone())
    }

    /// Remember `response` as the summary of `text` for `note_id`
    pub async fn insert(&self, note_id: &str, text: &str, response: SummarizeResponse) {
        if !self.enabled {
            return;
        }

        self.entries.lock().await.put(
            note_id.to_string(),
            CacheEntry {
                fingerprint: fingerprint(text),
                response,
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

/// Content fingerprint of note text, ignoring surrounding whitespace
pub fn fingerprint(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.trim().hash(&mut hasher);
    hasher.finish()
}
