use async_trait::async_trait;

use crate::error::Result;
use crate::models::ThreadState;

/// Keyed continuation state, one entry per thread id.
///
/// Writes are last-writer-wins per key. Serializing concurrent requests for
/// the same thread is the caller's job, not the store's.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    async fn get(&self, thread_id: &str) -> Result<Option<ThreadState>>;

    /// Insert or replace the state for a thread.
    async fn put(&self, thread_id: &str, state: ThreadState) -> Result<()>;

    /// Remove a thread. Returns whether anything was removed; removing an
    /// unknown thread is not an error.
    async fn delete(&self, thread_id: &str) -> Result<bool>;

    async fn thread_count(&self) -> Result<usize>;

    /// Drop entries the eviction policy considers expired.
    async fn purge_expired(&self) -> Result<usize> {
        Ok(0)
    }
}
