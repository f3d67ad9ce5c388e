//! Rate Limiter Store
//!
//! Fixed-window request counters keyed by caller identity.

use std::collections::HashMap;

use crate::cache::current_timestamp_ms;
use crate::limiter::RateRecord;

// == Rate Limiter ==
/// Fixed-window counter per key.
///
/// Bursts of up to twice the limit are possible across a window boundary.
/// Callers that need per-route quotas must fold the route into the key (see
/// [`bucket_key`]).
#[derive(Debug, Default)]
pub struct RateLimiter {
    records: HashMap<String, RateRecord>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    // == Allow ==
    /// Counts a request for `key` and reports whether it is within `limit`
    /// for a window of `window_ms`.
    pub fn allow(&mut self, key: &str, limit: u32, window_ms: u64) -> bool {
        self.allow_at(key, limit, window_ms, current_timestamp_ms())
    }

    /// [`RateLimiter::allow`] against an explicit clock.
    pub fn allow_at(&mut self, key: &str, limit: u32, window_ms: u64, now_ms: u64) -> bool {
        let record = self
            .records
            .entry(key.to_string())
            .or_insert_with(|| RateRecord::new(now_ms, window_ms));

        record.hit(now_ms, window_ms) <= limit
    }

    /// Returns the record tracked for `key`, if any.
    #[cfg(test)]
    pub(crate) fn record(&self, key: &str) -> Option<RateRecord> {
        self.records.get(key).copied()
    }

    // == Sweep ==
    /// Drops records whose window closed more than `grace_ms` ago.
    pub fn sweep_expired(&mut self, grace_ms: u64) -> usize {
        self.sweep_expired_at(current_timestamp_ms(), grace_ms)
    }

    /// [`RateLimiter::sweep_expired`] against an explicit clock.
    pub fn sweep_expired_at(&mut self, now_ms: u64, grace_ms: u64) -> usize {
        let before = self.records.len();
        self.records
            .retain(|_, record| !record.is_stale_at(now_ms, grace_ms));
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Builds the limiter key for `identity` on `route`, so that every route
/// keeps an independent quota for the same caller.
pub fn bucket_key(route: &str, identity: &str) -> String {
    format!("{route}:{identity}")
}
