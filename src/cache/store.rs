//! Cache Store Module
//!
//! Response cache combining HashMap storage with lazy TTL expiry and an LRU
//! capacity bound.

use std::collections::HashMap;

use serde_json::Value;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Cache Store ==
/// Keyed store of response payloads with per-entry expiry.
///
/// None of the operations fail: a read of a missing or expired key is simply
/// a miss, and a write always lands (evicting the least recently used entry
/// when the store is full).
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore bounded to `max_entries` (at least one).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
        }
    }

    // == Set ==
    /// Stores `value` under `key` for `ttl_seconds`, replacing any previous
    /// entry and its expiry.
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl_seconds: u64) {
        self.set_at(key, value, ttl_seconds, current_timestamp_ms());
    }

    /// [`CacheStore::set`] against an explicit clock.
    pub fn set_at(&mut self, key: impl Into<String>, value: Value, ttl_seconds: u64, now_ms: u64) {
        let key = key.into();
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            // Expired entries go first, then the least recently used one
            if self.cleanup_expired_at(now_ms) == 0 {
                if let Some(evicted_key) = self.lru.evict_oldest() {
                    self.entries.remove(&evicted_key);
                    self.stats.record_eviction();
                }
            }
        }

        self.entries
            .insert(key.clone(), CacheEntry::new(value, ttl_seconds, now_ms));
        self.lru.touch(&key);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the payload stored under `key` unless absent or expired.
    ///
    /// Expired entries are dropped on read and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        self.get_at(key, current_timestamp_ms())
    }

    /// [`CacheStore::get`] against an explicit clock.
    pub fn get_at(&mut self, key: &str, now_ms: u64) -> Option<Value> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired_at(now_ms),
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes every expired entry, returning how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        self.cleanup_expired_at(current_timestamp_ms())
    }

    /// [`CacheStore::cleanup_expired`] against an explicit clock.
    pub fn cleanup_expired_at(&mut self, now_ms: u64) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now_ms))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired_keys.len());
        self.stats.set_total_entries(self.entries.len());
        expired_keys.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(100);
        assert!(store.is_empty());
        assert_eq!(store.max_entries(), 100);
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(100);

        store.set_at("crypto:bitcoin:usd", json!({"price": 42}), 300, 0);

        assert_eq!(store.get_at("crypto:bitcoin:usd", 1_000), Some(json!({"price": 42})));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_missing() {
        let mut store = CacheStore::new(100);
        assert_eq!(store.get("nope"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_overwrite_resets_value_and_expiry() {
        let mut store = CacheStore::new(100);

        store.set_at("k", json!("v1"), 10, 0);
        store.set_at("k", json!("v2"), 10, 8_000);

        // Past the first expiry, inside the second
        assert_eq!(store.get_at("k", 15_000), Some(json!("v2")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = CacheStore::new(100);

        store.set_at("k", json!("v"), 1, 0);

        assert!(store.get_at("k", 999).is_some());
        assert_eq!(store.get_at("k", 1_000), None);
        assert!(store.is_empty(), "expired entry is dropped on read");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_store_wall_clock_roundtrip() {
        let mut store = CacheStore::new(10);
        store.set("k", json!([1, 2, 3]), 60);
        assert_eq!(store.get("k"), Some(json!([1, 2, 3])));
    }

    #[test]
    fn test_store_lru_eviction_when_full() {
        let mut store = CacheStore::new(3);

        store.set_at("key1", json!(1), 300, 0);
        store.set_at("key2", json!(2), 300, 0);
        store.set_at("key3", json!(3), 300, 0);
        store.get_at("key1", 1);
        store.set_at("key4", json!(4), 300, 2);

        assert_eq!(store.len(), 3);
        assert_eq!(store.get_at("key2", 3), None);
        assert!(store.get_at("key1", 3).is_some());
        assert!(store.get_at("key4", 3).is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_full_prefers_dropping_expired_entries() {
        let mut store = CacheStore::new(2);

        store.set_at("short", json!(1), 1, 0);
        store.set_at("long", json!(2), 300, 0);
        store.set_at("new", json!(3), 300, 5_000);

        assert!(store.get_at("long", 5_001).is_some());
        assert!(store.get_at("new", 5_001).is_some());
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let mut store = CacheStore::new(100);

        store.set_at("key1", json!(1), 1, 0);
        store.set_at("key2", json!(2), 10, 0);

        assert_eq!(store.cleanup_expired_at(1_100), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get_at("key2", 1_100).is_some());
    }
}
