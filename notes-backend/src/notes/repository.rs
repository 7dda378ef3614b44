//! NoteRepository: create/read/update/delete/list over the key-value store.
//!
//! There are no cross-key transactions. A multi-entry write that fails part
//! way leaves whatever entries were already written:
//! - create: an id whose `text` or `createdat` write failed is burned. It is
//!   never reused and listings skip it.
//! - delete: a failure after the `text` entry is gone leaves orphaned
//!   timestamp entries, which are invisible because existence is defined by
//!   the `text` entry.
//!
//! Concurrent requests are not ordered beyond the id counter. A listing racing
//! a create may or may not include the new note.

use chrono::Utc;
use notes_types::Note;
use std::sync::Arc;

use super::allocator::IdAllocator;
use super::codec::{self, NoteKeys, RawNote};
use super::context::RequestContext;
use super::error::{NoteError, NoteResult};
use crate::kv::KvStore;

#[derive(Clone)]
pub struct NoteRepository {
    store: Arc<dyn KvStore>,
    allocator: IdAllocator,
}

impl NoteRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let allocator = IdAllocator::new(store.clone());
        Self::with_allocator(store, allocator)
    }

    pub fn with_allocator(store: Arc<dyn KvStore>, allocator: IdAllocator) -> Self {
        Self { store, allocator }
    }

    /// Create a note and return its id.
    pub async fn create(&self, ctx: &RequestContext, text: &str) -> NoteResult<u64> {
        validate_text(text)?;
        let created_at = Utc::now();

        let id = self.allocator.next_id(ctx).await?;
        let keys = NoteKeys::for_id(id);

        let written = async {
            ctx.run(self.store.set(&keys.text, text)).await?;
            ctx.run(self.store.set(&keys.created_at, &codec::encode_timestamp(created_at)))
                .await
        }
        .await;

        if let Err(e) = written {
            log::warn!("[NOTES] Create failed after allocating id {}, id is burned: {}", id, e);
            return Err(e);
        }

        log::info!("[NOTES] Created note {}", id);
        Ok(id)
    }

    /// Read one note back from its entries.
    pub async fn get(&self, ctx: &RequestContext, id: u64) -> NoteResult<Note> {
        let keys = NoteKeys::for_id(id);

        let text = ctx.run(self.store.get(&keys.text)).await?;
        if text.is_none() {
            return Err(NoteError::NotFound(id));
        }
        let created_at = ctx.run(self.store.get(&keys.created_at)).await?;
        let updated_at = ctx.run(self.store.get(&keys.updated_at)).await?;

        codec::decode(
            id,
            RawNote {
                text,
                created_at,
                updated_at,
            },
        )
    }

    /// Replace a note's text and stamp its update time.
    ///
    /// Existence is not checked: updating an id that has no note writes a
    /// record without a creation time.
    pub async fn update(&self, ctx: &RequestContext, id: u64, text: &str) -> NoteResult<()> {
        validate_text(text)?;
        let keys = NoteKeys::for_id(id);

        let mut updated_at = Utc::now();
        if let Some(raw) = ctx.run(self.store.get(&keys.created_at)).await? {
            if !raw.is_empty() {
                let created_at = codec::decode_timestamp(&keys.created_at, &raw)?;
                updated_at = updated_at.max(created_at);
            }
        }

        ctx.run(self.store.set(&keys.text, text)).await?;
        ctx.run(self.store.set(&keys.updated_at, &codec::encode_timestamp(updated_at)))
            .await?;

        log::info!("[NOTES] Updated note {}", id);
        Ok(())
    }

    /// Remove every entry of a note. Deleting a missing note succeeds.
    pub async fn delete(&self, ctx: &RequestContext, id: u64) -> NoteResult<()> {
        let keys = NoteKeys::for_id(id);
        for key in keys.all() {
            if let Err(e) = ctx.run(self.store.del(key)).await {
                log::warn!("[NOTES] Delete of note {} stopped at {}: {}", id, key, e);
                return Err(e);
            }
        }
        log::info!("[NOTES] Deleted note {}", id);
        Ok(())
    }

    /// Every existing note, in id order.
    ///
    /// Walks ids 1 through the counter value. Ids without a note (deleted, or
    /// burned by a failed create) are skipped; any other error fails the
    /// whole listing.
    pub async fn list_all(&self, ctx: &RequestContext) -> NoteResult<Vec<Note>> {
        let highest = self.allocator.highest_issued(ctx).await?;

        let mut notes = Vec::new();
        for id in 1..=highest {
            match self.get(ctx, id).await {
                Ok(note) => notes.push(note),
                Err(NoteError::NotFound(_)) => {
                    log::debug!("[NOTES] Skipping absent note {}", id);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(notes)
    }
}

fn validate_text(text: &str) -> NoteResult<()> {
    if text.is_empty() {
        return Err(NoteError::EmptyText);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use crate::notes::codec::COUNTER_KEY;
    use crate::notes::{ErrorKind, ordering};
    use notes_types::SortField;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn setup() -> (Arc<MemoryStore>, NoteRepository) {
        let store = Arc::new(MemoryStore::new());
        let repo = NoteRepository::new(store.clone());
        (store, repo)
    }

    fn ctx() -> RequestContext {
        RequestContext::background()
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (store, repo) = setup();
        let id = repo.create(&ctx(), "do the dishes").await.unwrap();
        assert_eq!(id, 1);

        let note = repo.get(&ctx(), id).await.unwrap();
        assert_eq!(note.id, 1);
        assert_eq!(note.text, "do the dishes");
        assert!(note.created_at.is_some());
        assert!(note.updated_at.is_none());

        assert_eq!(store.peek("1text").as_deref(), Some("do the dishes"));
        assert!(store.peek("1createdat").is_some());
        assert_eq!(store.peek("1updatedat"), None);
    }

    #[tokio::test]
    async fn test_create_empty_text_issues_no_id() {
        let (store, repo) = setup();
        let err = repo.create(&ctx(), "").await.unwrap_err();
        assert!(matches!(err, NoteError::EmptyText));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.peek(COUNTER_KEY), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let (store, repo) = setup();
        let mut handles = Vec::new();
        for i in 0..40 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(&RequestContext::background(), &format!("note {}", i))
                    .await
                    .unwrap()
            }));
        }
        let mut ids = HashSet::new();
        for h in handles {
            assert!(ids.insert(h.await.unwrap()));
        }
        let counter: u64 = store.peek(COUNTER_KEY).unwrap().parse().unwrap();
        assert_eq!(ids.len(), 40);
        assert!(ids.iter().all(|id| *id <= counter));
    }

    #[tokio::test]
    async fn test_get_missing_note() {
        let (_store, repo) = setup();
        let err = repo.get(&ctx(), 42).await.unwrap_err();
        assert!(matches!(err, NoteError::NotFound(42)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_get_reads_updated_at_into_updated_at() {
        let (store, repo) = setup();
        store.insert("1text", "x");
        store.insert("1createdat", "100");
        store.insert("1updatedat", "200");

        let note = repo.get(&ctx(), 1).await.unwrap();
        assert_eq!(note.created_at.unwrap().timestamp(), 100);
        assert_eq!(note.updated_at.unwrap().timestamp(), 200);
    }

    #[tokio::test]
    async fn test_get_corrupt_timestamp_is_decode_error() {
        let (store, repo) = setup();
        store.insert("1text", "x");
        store.insert("1createdat", "100");
        store.insert("1updatedat", "not-a-number");

        let err = repo.get(&ctx(), 1).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_get_propagates_updated_at_read_failure() {
        let (store, repo) = setup();
        let id = repo.create(&ctx(), "x").await.unwrap();
        store.fail_key(NoteKeys::for_id(id).updated_at);

        let err = repo.get(&ctx(), id).await.unwrap_err();
        assert!(matches!(err, NoteError::Store(_)));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn test_update_sets_text_and_updated_at() {
        let (_store, repo) = setup();
        let id = repo.create(&ctx(), "first").await.unwrap();
        repo.update(&ctx(), id, "second").await.unwrap();

        let note = repo.get(&ctx(), id).await.unwrap();
        assert_eq!(note.text, "second");
        let created = note.created_at.unwrap();
        let updated = note.updated_at.unwrap();
        assert!(updated >= created);
    }

    #[tokio::test]
    async fn test_update_never_precedes_creation() {
        let (store, repo) = setup();
        let future = Utc::now().timestamp() + 3600;
        store.insert("1text", "x");
        store.insert("1createdat", future.to_string());

        repo.update(&ctx(), 1, "y").await.unwrap();
        assert_eq!(store.peek("1updatedat"), Some(future.to_string()));
    }

    #[tokio::test]
    async fn test_update_rejects_empty_text() {
        let (store, repo) = setup();
        let id = repo.create(&ctx(), "keep me").await.unwrap();
        let err = repo.update(&ctx(), id, "").await.unwrap_err();
        assert!(matches!(err, NoteError::EmptyText));
        assert_eq!(store.peek("1text").as_deref(), Some("keep me"));
    }

    #[tokio::test]
    async fn test_update_missing_note_writes_partial_record() {
        let (_store, repo) = setup();
        repo.update(&ctx(), 5, "orphan").await.unwrap();

        let note = repo.get(&ctx(), 5).await.unwrap();
        assert_eq!(note.text, "orphan");
        assert!(note.created_at.is_none());
        assert!(note.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_then_get_and_delete_again() {
        let (store, repo) = setup();
        let id = repo.create(&ctx(), "x").await.unwrap();
        repo.update(&ctx(), id, "y").await.unwrap();

        repo.delete(&ctx(), id).await.unwrap();
        assert!(matches!(repo.get(&ctx(), id).await, Err(NoteError::NotFound(_))));
        repo.delete(&ctx(), id).await.unwrap();

        // Only the counter remains.
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let (_store, repo) = setup();
        let a = repo.create(&ctx(), "a").await.unwrap();
        repo.delete(&ctx(), a).await.unwrap();
        let b = repo.create(&ctx(), "b").await.unwrap();
        assert!(b > a);
    }

    #[tokio::test]
    async fn test_failed_create_burns_id() {
        let (store, repo) = setup();
        store.fail_key("1createdat");

        let err = repo.create(&ctx(), "x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(store.peek(COUNTER_KEY).as_deref(), Some("1"));

        store.clear_faults();
        assert_eq!(repo.create(&ctx(), "y").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_partial_delete_leaves_note_absent() {
        let (store, repo) = setup();
        let id = repo.create(&ctx(), "x").await.unwrap();
        store.fail_key("1updatedat");

        let err = repo.delete(&ctx(), id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(matches!(repo.get(&ctx(), id).await, Err(NoteError::NotFound(1))));
        assert!(store.peek("1createdat").is_some());
        assert!(repo.list_all(&ctx()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_counter_fails_create_and_list_alike() {
        let (store, repo) = setup();
        store.insert(COUNTER_KEY, "abc");

        let created = repo.create(&ctx(), "x").await.unwrap_err();
        let listed = repo.list_all(&ctx()).await.unwrap_err();
        assert_eq!(created.kind(), ErrorKind::Decode);
        assert_eq!(listed.kind(), ErrorKind::Decode);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_list_all_skips_absent_ids() {
        let (_store, repo) = setup();
        for text in ["one", "two", "three"] {
            repo.create(&ctx(), text).await.unwrap();
        }
        repo.delete(&ctx(), 2).await.unwrap();

        let notes = repo.list_all(&ctx()).await.unwrap();
        let ids: Vec<u64> = notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(notes[1].text, "three");
    }

    #[tokio::test]
    async fn test_list_all_without_counter_is_empty() {
        let (_store, repo) = setup();
        assert!(repo.list_all(&ctx()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_fails_on_corrupt_note() {
        let (store, repo) = setup();
        repo.create(&ctx(), "a").await.unwrap();
        repo.create(&ctx(), "b").await.unwrap();
        store.insert("2createdat", "garbage");

        let err = repo.list_all(&ctx()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_list_then_sort() {
        let (_store, repo) = setup();
        for text in ["pear", "apple", "fig"] {
            repo.create(&ctx(), text).await.unwrap();
        }
        let mut notes = repo.list_all(&ctx()).await.unwrap();
        ordering::sort_by(SortField::Text, &mut notes).unwrap();
        let texts: Vec<&str> = notes.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["apple", "fig", "pear"]);

        assert!(matches!(
            ordering::sort_by(SortField::UpdatedAt, &mut notes),
            Err(NoteError::UnsortableField { .. })
        ));
    }

    #[tokio::test]
    async fn test_store_offline_is_transport_error() {
        let (store, repo) = setup();
        store.set_offline(true);
        for err in [
            repo.create(&ctx(), "x").await.unwrap_err(),
            repo.get(&ctx(), 1).await.unwrap_err(),
            repo.update(&ctx(), 1, "x").await.unwrap_err(),
            repo.delete(&ctx(), 1).await.unwrap_err(),
            repo.list_all(&ctx()).await.unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::Transport);
        }
    }

    #[tokio::test]
    async fn test_slow_store_hits_deadline() {
        let (store, repo) = setup();
        store.set_latency(Some(Duration::from_millis(200)));
        let ctx = RequestContext::with_timeout(Duration::from_millis(20));
        let err = repo.create(&ctx, "x").await.unwrap_err();
        assert!(matches!(err, NoteError::Timeout));
    }

    #[tokio::test]
    async fn test_cancelled_request_makes_no_store_calls() {
        let (store, repo) = setup();
        let token = CancellationToken::new();
        token.cancel();
        let ctx = RequestContext::background().with_cancel(token);
        let err = repo.create(&ctx, "x").await.unwrap_err();
        assert!(matches!(err, NoteError::Cancelled));
        assert!(store.is_empty());
    }
}
