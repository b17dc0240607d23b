use std::num::NonZeroUsize;
use std::time::Duration;

use crate::eviction::{EvictionPolicy, NoExpiry, TtlPolicy};
use crate::memory::MemoryThreadStore;

/// Builder for an in-memory thread store with optional eviction.
pub struct ThreadStoreBuilder {
    max_threads: Option<NonZeroUsize>,
    policy: Box<dyn EvictionPolicy>,
}

impl ThreadStoreBuilder {
    pub fn new() -> Self {
        Self {
            max_threads: None,
            policy: Box::new(NoExpiry),
        }
    }

    /// Expire threads not updated within `ttl`
    pub fn ttl(self, ttl: Duration) -> Self {
        self.eviction_policy(TtlPolicy::new(ttl))
    }

    pub fn eviction_policy(mut self, policy: impl EvictionPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Keep at most `max` threads, evicting the least recently used.
    /// Zero means unbounded.
    pub fn max_threads(mut self, max: usize) -> Self {
        self.max_threads = NonZeroUsize::new(max);
        self
    }

    pub fn build(self) -> MemoryThreadStore {
        MemoryThreadStore::with_config(self.max_threads, self.policy)
    }
}

impl Default for ThreadStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
