//! Application state and the shared request pipeline.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, warn};

use crate::api::RoutePolicy;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::limiter::{bucket_key, RateLimiter};
use crate::models::Envelope;
use crate::upstream::{UpstreamClient, UpstreamError};

/// Application state shared across all handlers.
///
/// Both stores are process-wide; each lock covers one whole
/// read-modify-write so concurrent requests for the same key never race.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RwLock<CacheStore>>,
    pub limiter: Arc<Mutex<RateLimiter>>,
    pub upstream: UpstreamClient,
    pub config: Arc<Config>,
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new AppState around the given stores.
    pub fn new(
        cache: CacheStore,
        limiter: RateLimiter,
        upstream: UpstreamClient,
        config: Config,
    ) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            limiter: Arc::new(Mutex::new(limiter)),
            upstream,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    /// Creates a new AppState with empty stores sized from configuration.
    pub fn from_config(config: Config) -> std::result::Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(config.upstream.clone())?;
        Ok(Self::new(
            CacheStore::new(config.max_cache_entries),
            RateLimiter::new(),
            upstream,
            config,
        ))
    }

    // == Rate Limit ==
    /// Counts this request against the caller's quota for `policy`.
    pub async fn check_rate(&self, policy: &RoutePolicy, identity: &str) -> Result<()> {
        let key = bucket_key(policy.name, identity);
        let allowed = self
            .limiter
            .lock()
            .await
            .allow(&key, policy.limit, policy.window_ms);

        if allowed {
            Ok(())
        } else {
            Err(ApiError::RateLimited)
        }
    }

    // == Cache-or-Compute ==
    /// Serves `key` from the cache, or runs `compute` and caches its result
    /// for the policy's TTL. Failures are never cached.
    pub async fn cached<F, Fut>(&self, policy: &RoutePolicy, key: &str, compute: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let key = format!("{}:{}", policy.name, key);

        if let Some(hit) = self.cache.write().await.get(&key) {
            debug!(route = policy.name, %key, "cache hit");
            return Ok(hit);
        }

        let value = compute().await?;
        self.cache
            .write()
            .await
            .set(key, value.clone(), policy.ttl_secs);
        Ok(value)
    }
}

/// Turns a handler result into the enveloped response, logging failures
/// with the route and caller.
pub fn respond(policy: &RoutePolicy, identity: &str, result: Result<Value>) -> Response {
    match result {
        Ok(data) => Envelope::ok(data).into_response(),
        Err(err) => {
            log_failure(policy.name, identity, &err);
            err.into_response()
        }
    }
}

pub(crate) fn log_failure(route: &str, identity: &str, err: &ApiError) {
    match err {
        ApiError::Upstream { message, source } => {
            error!(route, client = identity, error = %source, "{message}");
        }
        ApiError::Internal { message, detail } => {
            error!(route, client = identity, detail = %detail, "{message}");
        }
        ApiError::RateLimited => warn!(route, client = identity, "Rate limit exceeded"),
        other => debug!(route, client = identity, error = %other, "request rejected"),
    }
}
