//! Response DTOs for the service endpoints
//!
//! Bodies of `/health` and `/api/status`, which are not enveloped.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub uptime_secs: u64,
    pub version: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(uptime_secs: u64) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_secs,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Cache counters as reported by the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    /// Capacity before LRU eviction starts
    pub max_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl CacheStatus {
    pub fn new(stats: CacheStats, max_entries: usize) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            max_entries,
        }
    }
}

/// Response body for GET /api/status
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub status: String,
    /// Route name to availability
    pub services: BTreeMap<String, String>,
    pub weather_source: String,
    pub cache: CacheStatus,
    /// Rate-limit records currently held
    pub tracked_clients: usize,
    pub last_updated: String,
}

impl StatusResponse {
    pub fn operational<'a>(
        routes: impl IntoIterator<Item = &'a str>,
        weather_source: &str,
        cache: CacheStatus,
        tracked_clients: usize,
    ) -> Self {
        Self {
            status: "operational".to_string(),
            services: routes
                .into_iter()
                .map(|name| (name.to_string(), "operational".to_string()))
                .collect(),
            weather_source: weather_source.to_string(),
            cache,
            tracked_clients,
            last_updated: chrono::Utc::now().to_rfc3339(),
        }
    }
}
