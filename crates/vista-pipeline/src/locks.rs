use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// Keyed async mutexes, one per thread id currently in use.
///
/// Entries exist only while some task holds or waits on them.
#[derive(Clone, Default)]
pub struct ThreadLocks {
    inner: Arc<Mutex<LockMap>>,
}

impl ThreadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, thread_id: &str) -> ThreadGuard {
        let slot = {
            let mut map = self.inner.lock();
            Slot {
                thread_id: thread_id.to_string(),
                lock: Arc::clone(map.entry(thread_id.to_string()).or_default()),
                locks: Arc::clone(&self.inner),
            }
        };

        // A waiter cancelled here still drops `slot`, which cleans up the entry.
        let guard = Arc::clone(&slot.lock).lock_owned().await;

        ThreadGuard {
            guard: Some(guard),
            _slot: slot,
        }
    }

    /// Number of thread ids with a holder or waiter.
    pub fn active(&self) -> usize {
        self.inner.lock().len()
    }
}

/// One holder's or waiter's claim on a map entry.
struct Slot {
    thread_id: String,
    lock: Arc<AsyncMutex<()>>,
    locks: Arc<Mutex<LockMap>>,
}

impl Drop for Slot {
    fn drop(&mut self) {
        // map lock held: nobody can clone the entry between check and remove.
        // Two references left means only the map and this slot.
        let mut map = self.locks.lock();
        if Arc::strong_count(&self.lock) == 2 {
            map.remove(&self.thread_id);
        }
    }
}

pub struct ThreadGuard {
    guard: Option<OwnedMutexGuard<()>>,
    _slot: Slot,
}

impl Drop for ThreadGuard {
    fn drop(&mut self) {
        // release before the slot checks whether the entry is still shared
        drop(self.guard.take());
    }
}
