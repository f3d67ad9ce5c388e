//! Sweeper Task
//!
//! Background task that periodically removes expired cache entries and
//! rate-limit records whose window closed long ago.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::limiter::RateLimiter;

/// Spawns a background task that sweeps both stores every
/// `cleanup_interval_secs`.
///
/// Rate-limit records are dropped once their window has been closed for
/// more than `grace_secs`. Each store is locked only for its own sweep.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<CacheStore>>,
    limiter: Arc<Mutex<RateLimiter>>,
    cleanup_interval_secs: u64,
    grace_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));
    let grace_ms = grace_secs.saturating_mul(1_000);

    tokio::spawn(async move {
        info!(
            "Starting sweeper with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let expired = cache.write().await.cleanup_expired();
            let stale = limiter.lock().await.sweep_expired(grace_ms);

            if expired > 0 || stale > 0 {
                info!(expired, stale, "Sweep removed expired entries");
            } else {
                debug!("Sweep found nothing to remove");
            }
        }
    })
}
