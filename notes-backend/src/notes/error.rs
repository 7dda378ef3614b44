use notes_types::SortField;

use crate::kv::StoreError;

/// Coarse error class handed to the routing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Decode,
    Transport,
}

#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("note text must not be empty")]
    EmptyText,
    #[error("unknown sort field: {0:?}")]
    UnknownSortField(String),
    #[error("cannot order by {field}: note {id} has no value for it")]
    UnsortableField { field: SortField, id: u64 },
    #[error("note {0} not found")]
    NotFound(u64),
    #[error("corrupt value {value:?} stored at {key}")]
    Decode { key: String, value: String },
    #[error("corrupt id counter value {0:?}")]
    CorruptCounter(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("store call exceeded the request deadline")]
    Timeout,
    #[error("request cancelled")]
    Cancelled,
}

impl NoteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NoteError::EmptyText
            | NoteError::UnknownSortField(_)
            | NoteError::UnsortableField { .. } => ErrorKind::Validation,
            NoteError::NotFound(_) => ErrorKind::NotFound,
            NoteError::Decode { .. } | NoteError::CorruptCounter(_) => ErrorKind::Decode,
            NoteError::Store(_) | NoteError::Timeout | NoteError::Cancelled => {
                ErrorKind::Transport
            }
        }
    }
}

pub type NoteResult<T> = Result<T, NoteError>;
