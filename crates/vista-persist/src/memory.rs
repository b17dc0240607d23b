use async_trait::async_trait;
use chrono::Utc;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

use crate::error::Result;
use crate::eviction::{EvictionPolicy, NoExpiry};
use crate::models::ThreadState;
use crate::store::ThreadStore;

/// Process-local thread store.
///
/// Unbounded with no expiry by default. A capacity turns it into an LRU;
/// an eviction policy hides and lazily drops expired threads.
pub struct MemoryThreadStore {
    threads: Mutex<LruCache<String, ThreadState>>,
    policy: Box<dyn EvictionPolicy>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::with_config(None, Box::new(NoExpiry))
    }

    pub fn builder() -> crate::builder::ThreadStoreBuilder {
        crate::builder::ThreadStoreBuilder::new()
    }

    pub(crate) fn with_config(max_threads: Option<NonZeroUsize>, policy: Box<dyn EvictionPolicy>) -> Self {
        let cache = match max_threads {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        Self {
            threads: Mutex::new(cache),
            policy,
        }
    }

    pub fn capacity(&self) -> usize {
        self.threads.lock().cap().get()
    }
}

impl Default for MemoryThreadStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn get(&self, thread_id: &str) -> Result<Option<ThreadState>> {
        let mut threads = self.threads.lock();

        let expired = match threads.get(thread_id) {
            Some(state) => self.policy.is_expired(state, Utc::now()),
            None => return Ok(None),
        };

        if expired {
            threads.pop(thread_id);
            tracing::debug!(thread_id = %thread_id, "Dropped expired thread on read");
            return Ok(None);
        }

        Ok(threads.get(thread_id).cloned())
    }

    async fn put(&self, thread_id: &str, state: ThreadState) -> Result<()> {
        let evicted = self.threads.lock().push(thread_id.to_string(), state);

        if let Some((evicted_id, _)) = evicted {
            if evicted_id != thread_id {
                tracing::info!(thread_id = %evicted_id, "Evicted least recently used thread");
            }
        }
        Ok(())
    }

    async fn delete(&self, thread_id: &str) -> Result<bool> {
        Ok(self.threads.lock().pop(thread_id).is_some())
    }

    async fn thread_count(&self) -> Result<usize> {
        Ok(self.threads.lock().len())
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut threads = self.threads.lock();

        let expired: Vec<String> = threads
            .iter()
            .filter(|(_, state)| self.policy.is_expired(state, now))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            threads.pop(id);
        }
        Ok(expired.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eviction::TtlPolicy;
    use std::time::Duration;

    fn state(image_id: &str) -> ThreadState {
        ThreadState::first(image_id, vec![7, 7, 7], "image/png", "seed")
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryThreadStore::new();
        assert!(store.get("t").await.unwrap().is_none());

        store.put("t", state("img-1")).await.unwrap();
        assert_eq!(store.get("t").await.unwrap().unwrap().last_image_id, "img-1");
        assert_eq!(store.thread_count().await.unwrap(), 1);

        assert!(store.delete("t").await.unwrap());
        assert!(store.get("t").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_an_error() {
        let store = MemoryThreadStore::new();
        assert!(!store.delete("never-existed").await.unwrap());
        assert!(!store.delete("never-existed").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryThreadStore::new();
        store.put("t", state("img-1")).await.unwrap();
        store.put("t", state("img-2")).await.unwrap();

        assert_eq!(store.get("t").await.unwrap().unwrap().last_image_id, "img-2");
        assert_eq!(store.thread_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_thread_is_invisible() {
        let store = MemoryThreadStore::with_config(None, Box::new(TtlPolicy::new(Duration::from_secs(60))));
        let mut old = state("img-old");
        old.updated_at = Utc::now() - chrono::Duration::minutes(5);

        store.put("old", old).await.unwrap();
        store.put("fresh", state("img-new")).await.unwrap();

        assert!(store.get("old").await.unwrap().is_none());
        assert_eq!(store.thread_count().await.unwrap(), 1);
        assert!(store.get("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryThreadStore::with_config(None, Box::new(TtlPolicy::new(Duration::from_secs(60))));
        for id in ["a", "b"] {
            let mut old = state(id);
            old.updated_at = Utc::now() - chrono::Duration::minutes(10);
            store.put(id, old).await.unwrap();
        }
        store.put("c", state("c")).await.unwrap();

        assert_eq!(store.purge_expired().await.unwrap(), 2);
        assert_eq!(store.thread_count().await.unwrap(), 1);
    }
}
