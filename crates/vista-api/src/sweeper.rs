use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use vista_persist::ThreadStore;

/// Periodically drops expired threads so idle memory is reclaimed even
/// when nobody touches those threads again.
pub fn spawn_store_sweeper(store: Arc<dyn ThreadStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => tracing::info!(purged, "Purged expired threads"),
                Err(e) => tracing::warn!("Thread sweep failed: {}", e),
            }
        }
    })
}
