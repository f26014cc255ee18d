use crate::models::{Frequency, ObservationSeries};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Cache key: provider series id plus the frequency it was requested at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub series_id: String,
    pub frequency: Frequency,
}

impl CacheKey {
    pub fn new(series_id: impl Into<String>, frequency: Frequency) -> Self {
        Self { series_id: series_id.into(), frequency }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    series: ObservationSeries,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

/// In-memory response cache with per-entry TTL.
///
/// Expired entries stay readable (flagged stale) so the orchestrator can fall
/// back to them once every live fetch attempt has failed.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<CacheKey, CacheEntry>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached series and whether it is still within its TTL.
    pub fn get(&self, key: &CacheKey) -> Option<(&ObservationSeries, bool)> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<(&ObservationSeries, bool)> {
        self.entries
            .get(key)
            .map(|entry| (&entry.series, entry.is_fresh_at(now)))
    }

    pub fn put(&mut self, key: CacheKey, series: ObservationSeries, ttl: Duration) {
        self.put_at(key, series, ttl, Instant::now());
    }

    pub fn put_at(&mut self, key: CacheKey, series: ObservationSeries, ttl: Duration, now: Instant) {
        self.entries.insert(key, CacheEntry { series, stored_at: now, ttl });
    }

    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drops entries older than their TTL; returns how many were removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh_at(now));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
