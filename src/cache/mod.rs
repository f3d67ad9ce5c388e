//! Cache Module
//!
//! In-memory response cache with lazy TTL expiry and an LRU capacity bound.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, time_bucket, CacheEntry};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CacheStore;
