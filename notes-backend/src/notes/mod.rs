//! Note persistence over a schemaless key-value store.
//!
//! A note is not stored as one blob: each field lives in its own entry, keyed
//! by the note id plus a field suffix, and ids come from a shared counter.
//! The codec owns the key layout, the allocator owns the counter, and the
//! repository composes them into the CRUD contract the HTTP layer calls.

pub mod allocator;
pub mod codec;
pub mod context;
pub mod error;
pub mod ordering;
pub mod repository;

pub use allocator::IdAllocator;
pub use context::RequestContext;
pub use error::{ErrorKind, NoteError, NoteResult};
pub use repository::NoteRepository;
