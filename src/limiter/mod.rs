//! Rate Limiter Module
//!
//! Fixed-window request counting per caller identity and route.

mod record;
mod store;


pub use record::RateRecord;
pub use store::{bucket_key, RateLimiter};

/// One hour, the window every public route is limited over.
pub const HOUR_MS: u64 = 60 * 60 * 1000;
