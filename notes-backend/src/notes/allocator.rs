//! Note id allocation over the store's atomic counter.
//!
//! Holds no state of its own, so any number of allocators (in any number of
//! processes) sharing one store hand out distinct ids.

use std::sync::Arc;

use super::codec::{self, COUNTER_KEY};
use super::context::RequestContext;
use super::error::{NoteError, NoteResult};
use crate::kv::{KvStore, StoreError};

#[derive(Clone)]
pub struct IdAllocator {
    store: Arc<dyn KvStore>,
}

impl IdAllocator {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Issue the next id. A failed call has not consumed an id as far as the
    /// caller is concerned.
    pub async fn next_id(&self, ctx: &RequestContext) -> NoteResult<u64> {
        let value = match ctx.run(self.store.incr(COUNTER_KEY)).await {
            Ok(value) => value,
            Err(NoteError::Store(StoreError::NotAnInteger(_))) => {
                let raw = ctx.run(self.store.get(COUNTER_KEY)).await?;
                return Err(NoteError::CorruptCounter(raw.unwrap_or_default()));
            }
            Err(e) => return Err(e),
        };
        u64::try_from(value)
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| NoteError::CorruptCounter(value.to_string()))
    }

    /// Highest id issued so far, 0 if none.
    pub async fn highest_issued(&self, ctx: &RequestContext) -> NoteResult<u64> {
        let raw = ctx.run(self.store.get(COUNTER_KEY)).await?;
        codec::decode_counter(raw.as_deref())
    }
}
