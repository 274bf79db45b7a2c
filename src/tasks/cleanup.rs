//! Stale Entry Sweep Task
//!
//! Background task that periodically drops fetch cache entries past their TTL.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::FetchCache;

/// Spawns a background task that sweeps stale entries out of the fetch cache.
///
/// Stale entries are never served even without this task; the sweep only
/// bounds memory held by squares nobody has requested recently.
///
/// # Arguments
/// * `cache` - shared fetch cache
/// * `cleanup_interval_secs` - seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(FetchCache::new(Duration::from_secs(300), 200)));
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<FetchCache>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    spawn_with_interval(cache, Duration::from_secs(cleanup_interval_secs.max(1)))
}

fn spawn_with_interval(cache: Arc<RwLock<FetchCache>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "Starting fetch cache sweep task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let (removed, remaining) = {
                let mut cache_guard = cache.write().await;
                let removed = cache_guard.cleanup_expired();
                (removed, cache_guard.len())
            };

            if removed > 0 {
                info!(removed, remaining, "Fetch cache sweep removed stale entries");
            } else {
                debug!(remaining, "Fetch cache sweep found nothing stale");
            }
        }
    })
}
