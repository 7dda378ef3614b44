//! Per-request cancellation and deadline.
//!
//! Store round-trips are the only points where a request can block, so each
//! one is raced against the request's cancellation token and remaining time.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::error::{NoteError, NoteResult};
use crate::kv::StoreResult;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Context with no deadline that is never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run one store call under this context.
    pub async fn run<T, F>(&self, call: F) -> NoteResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(NoteError::Cancelled);
        }
        let result = match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.cancel.cancelled() => return Err(NoteError::Cancelled),
                    res = tokio::time::timeout_at(deadline, call) => {
                        res.map_err(|_| NoteError::Timeout)?
                    }
                }
            }
            None => {
                tokio::select! {
                    _ = self.cancel.cancelled() => return Err(NoteError::Cancelled),
                    res = call => res,
                }
            }
        };
        Ok(result?)
    }
}
