//! Query Cache Sweep Task
//!
//! Background task that periodically removes long-stale query results.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::QueryCache;

/// Spawns a background task that sweeps the query cache every `interval`.
///
/// Entries that have been stale for at least `gc_time` are removed; fresh
/// and recently stale entries are kept so readers can still be served while
/// a refetch runs.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(service.cache(), Duration::from_secs(60), DEFAULT_GC_TIME);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(
    cache: Arc<RwLock<QueryCache<V>>>,
    interval: Duration,
    gc_time: Duration,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            "Starting query cache sweep every {:?}, retaining stale results for {:?}",
            interval, gc_time
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.sweep(gc_time)
            };

            if removed > 0 {
                info!("Query cache sweep: removed {} stale results", removed);
            } else {
                debug!("Query cache sweep: nothing to remove");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Lookup, QueryKey};

    #[tokio::test]
    async fn test_sweep_removes_long_stale_entries() {
        let cache = Arc::new(RwLock::new(QueryCache::new(Duration::from_secs(300))));
        cache
            .write()
            .await
            .set(QueryKey::Expenses, 1u32, Some(Duration::from_millis(10)));

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(50), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.read().await.is_empty(), "stale entry should have been swept");
        assert_eq!(cache.write().await.get(QueryKey::Expenses), Lookup::Miss);
        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_keeps_fresh_entries() {
        let cache = Arc::new(RwLock::new(QueryCache::new(Duration::from_secs(300))));
        cache.write().await.set(QueryKey::Expenses, 7u32, None);

        let handle = spawn_cleanup_task(cache.clone(), Duration::from_millis(20), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.write().await.get(QueryKey::Expenses), Lookup::Fresh(7));
        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache: Arc<RwLock<QueryCache<u32>>> =
            Arc::new(RwLock::new(QueryCache::new(Duration::from_secs(300))));

        let handle = spawn_cleanup_task(cache, Duration::from_secs(1), Duration::from_secs(1));

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
