//! In-process store with redis-compatible semantics.
//!
//! Used for local runs without a redis server (`NOTES_STORE=memory`) and by
//! the test suite, which relies on the fault hooks to simulate a store that
//! drops specific commands or goes away entirely.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::{KvStore, StoreError, StoreResult};

#[derive(Default)]
struct Faults {
    offline: bool,
    failing_keys: HashSet<String>,
    latency: Option<Duration>,
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    faults: Mutex<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every command fail as if the server were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.faults.lock().offline = offline;
    }

    /// Make every command touching `key` fail.
    pub fn fail_key(&self, key: impl Into<String>) {
        self.faults.lock().failing_keys.insert(key.into());
    }

    pub fn clear_faults(&self) {
        *self.faults.lock() = Faults::default();
    }

    /// Delay every command by `latency` before it runs.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.faults.lock().latency = latency;
    }

    /// Raw read that bypasses fault injection
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    /// Raw write that bypasses fault injection
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.lock().insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    async fn check(&self, key: &str) -> StoreResult<()> {
        let latency = {
            let faults = self.faults.lock();
            if faults.offline {
                return Err(StoreError::Unavailable("memory store is offline".to_string()));
            }
            if faults.failing_keys.contains(key) {
                return Err(StoreError::Command(format!("injected failure on key {}", key)));
            }
            faults.latency
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        Ok(())
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn incr(&self, key: &str) -> StoreResult<i64> {
        self.check(key).await?;
        let mut entries = self.entries.lock();
        let current = match entries.get(key) {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| StoreError::NotAnInteger(key.to_string()))?,
            None => 0,
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| StoreError::Command("increment would overflow".to_string()))?;
        entries.insert(key.to_string(), next.to_string());
        Ok(next)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check(key).await?;
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check(key).await?;
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        self.check(key).await?;
        self.entries.lock().remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
