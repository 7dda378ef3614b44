//! In-memory ordering of recomposed notes.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use notes_types::{Note, SortField};

use super::error::{NoteError, NoteResult};

/// Parse a caller-supplied field name.
pub fn parse_sort_field(raw: &str) -> NoteResult<SortField> {
    SortField::from_str(raw).map_err(|_| NoteError::UnknownSortField(raw.to_string()))
}

/// Stable ascending sort of `notes` by `field`.
///
/// Timestamp orderings require every note to carry the timestamp; a note
/// without one fails the whole sort and leaves `notes` untouched.
pub fn sort_by(field: SortField, notes: &mut [Note]) -> NoteResult<()> {
    match field {
        SortField::Id => notes.sort_by_key(|n| n.id),
        SortField::Text => notes.sort_by(|a, b| a.text.cmp(&b.text)),
        SortField::CreatedAt => {
            require_all(field, notes, |n| n.created_at)?;
            notes.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }
        SortField::UpdatedAt => {
            require_all(field, notes, |n| n.updated_at)?;
            notes.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        }
    }
    Ok(())
}

fn require_all<F>(field: SortField, notes: &[Note], get: F) -> NoteResult<()>
where
    F: Fn(&Note) -> Option<DateTime<Utc>>,
{
    match notes.iter().find(|n| get(n).is_none()) {
        Some(n) => Err(NoteError::UnsortableField { field, id: n.id }),
        None => Ok(()),
    }
}
