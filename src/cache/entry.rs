//! Cache Entry Module
//!
//! Defines a single cached response payload with its expiry.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

// == Cache Entry ==
/// A cached payload together with its creation and expiry instants.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload (already shaped for the envelope `data` field)
    pub value: Value,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry that expires `ttl_seconds` after `now_ms`.
    pub fn new(value: Value, ttl_seconds: u64, now_ms: u64) -> Self {
        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry is expired once the current time reaches its expiry, so a
    /// zero TTL produces an entry that is never served.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Returns the index of the `bucket_secs`-wide time bucket containing `now_ms`.
///
/// Volatile routes embed this in their cache keys so that similar requests
/// inside the same bucket share one cached payload.
pub fn time_bucket(now_ms: u64, bucket_secs: u64) -> u64 {
    if bucket_secs == 0 {
        return now_ms;
    }
    now_ms / (bucket_secs * 1000)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!({"price": 1}), 60, 1_000);

        assert_eq!(entry.value, json!({"price": 1}));
        assert_eq!(entry.created_at, 1_000);
        assert_eq!(entry.expires_at, 61_000);
        assert!(!entry.is_expired_at(1_000));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(json!("v"), 1, 0);

        assert!(!entry.is_expired_at(999));
        assert!(entry.is_expired_at(1_000));
        assert!(entry.is_expired_at(5_000));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new(json!("v"), 0, 42);
        assert!(entry.is_expired_at(42));
    }

    #[test]
    fn test_wall_clock_entry_is_fresh() {
        let now = current_timestamp_ms();
        let entry = CacheEntry::new(json!("v"), 60, now);
        assert!(!entry.is_expired_at(now + 59_999));
    }

    #[test]
    fn test_time_bucket_alignment() {
        // 5-minute buckets
        assert_eq!(time_bucket(0, 300), 0);
        assert_eq!(time_bucket(299_999, 300), 0);
        assert_eq!(time_bucket(300_000, 300), 1);
        assert_eq!(time_bucket(1_800_000, 1800), 1);
    }
}
