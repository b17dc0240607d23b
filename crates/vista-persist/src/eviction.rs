use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::models::ThreadState;

/// Decides when a stored thread is no longer worth keeping.
pub trait EvictionPolicy: Send + Sync {
    fn is_expired(&self, state: &ThreadState, now: DateTime<Utc>) -> bool;
}

/// Threads live until they are cleared.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExpiry;

impl EvictionPolicy for NoExpiry {
    fn is_expired(&self, _state: &ThreadState, _now: DateTime<Utc>) -> bool {
        false
    }
}

/// Threads expire once their last update is older than `ttl`.
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    pub ttl: Duration,
}

impl TtlPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }
}

impl EvictionPolicy for TtlPolicy {
    fn is_expired(&self, state: &ThreadState, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(state.updated_at)
            .to_std()
            .map(|age| age >= self.ttl)
            .unwrap_or(false)
    }
}
