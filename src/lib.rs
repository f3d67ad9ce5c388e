//! Freebie API - free utility endpoints behind one rate-limited gateway
//!
//! Serves prices, weather, quotes, memes and local generators with a shared
//! response envelope, per-route quotas and a TTL/LRU response cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod routes;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
