//! Key-value store collaborator.
//!
//! The notes layer only needs four string-keyed primitives from its backing
//! store: atomic increment, get, set and delete. There are no transactions
//! across keys. A missing key is reported as `None` from `get`, never as an
//! error, so callers can tell "absent" apart from "store unreachable".

pub mod memory;
pub mod redis;

use async_trait::async_trait;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Connection or command failure reported by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("value at {0} is not an integer or out of range")]
    NotAnInteger(String),
    #[error("store command failed: {0}")]
    Command(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Atomically increment the integer at `key` by one and return the new value.
    /// A missing key counts as 0. A value that is not an integer fails with
    /// `StoreError::NotAnInteger`.
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`. Removing a key that does not exist succeeds.
    async fn del(&self, key: &str) -> StoreResult<()>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}
