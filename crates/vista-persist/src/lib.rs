pub mod builder;
pub mod error;
pub mod eviction;
pub mod memory;
pub mod models;
pub mod store;

pub use builder::ThreadStoreBuilder;
pub use error::{Result, StoreError};
pub use eviction::{EvictionPolicy, NoExpiry, TtlPolicy};
pub use memory::MemoryThreadStore;
pub use models::ThreadState;
pub use store::ThreadStore;
