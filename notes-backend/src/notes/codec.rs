//! Record codec: one note is spread over up to three store entries.
//!
//! Keys are the decimal id followed directly by a field suffix, e.g. `12text`,
//! `12createdat`, `12updatedat`. The suffixes are alphabetic, so no key of one
//! id can be mistaken for a key of another. Timestamps are stored as Unix
//! epoch seconds in decimal.
//!
//! Nothing outside this module builds key strings.

use chrono::{DateTime, TimeZone, Utc};
use notes_types::Note;

use super::error::{NoteError, NoteResult};

/// Global id counter shared by all notes.
pub const COUNTER_KEY: &str = "index";

const TEXT_SUFFIX: &str = "text";
const CREATED_AT_SUFFIX: &str = "createdat";
const UPDATED_AT_SUFFIX: &str = "updatedat";

/// The store keys holding the fields of a single note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteKeys {
    pub text: String,
    pub created_at: String,
    pub updated_at: String,
}

impl NoteKeys {
    pub fn for_id(id: u64) -> Self {
        Self {
            text: format!("{}{}", id, TEXT_SUFFIX),
            created_at: format!("{}{}", id, CREATED_AT_SUFFIX),
            updated_at: format!("{}{}", id, UPDATED_AT_SUFFIX),
        }
    }

    /// All keys, in the order they are removed on delete.
    pub fn all(&self) -> [&str; 3] {
        [&self.text, &self.updated_at, &self.created_at]
    }
}

/// Raw entry values read back for one id.
#[derive(Debug, Default, Clone)]
pub struct RawNote {
    pub text: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

pub fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.timestamp().to_string()
}

pub fn decode_timestamp(key: &str, raw: &str) -> NoteResult<DateTime<Utc>> {
    let corrupt = || NoteError::Decode {
        key: key.to_string(),
        value: raw.to_string(),
    };
    let secs: i64 = raw.parse().map_err(|_| corrupt())?;
    Utc.timestamp_opt(secs, 0).single().ok_or_else(corrupt)
}

fn decode_optional(key: &str, raw: Option<&str>) -> NoteResult<Option<DateTime<Utc>>> {
    match raw {
        // An empty value is treated like an absent one.
        None | Some("") => Ok(None),
        Some(raw) => decode_timestamp(key, raw).map(Some),
    }
}

/// Recompose a note from its entries. A missing text entry means the note
/// does not exist; missing timestamps leave the field unset.
pub fn decode(id: u64, raw: RawNote) -> NoteResult<Note> {
    let keys = NoteKeys::for_id(id);
    let text = raw.text.ok_or(NoteError::NotFound(id))?;
    let created_at = decode_optional(&keys.created_at, raw.created_at.as_deref())?;
    let updated_at = decode_optional(&keys.updated_at, raw.updated_at.as_deref())?;

    Ok(Note {
        id,
        text,
        created_at,
        updated_at,
    })
}

/// Parse the counter entry. An absent counter means no id was ever issued.
pub fn decode_counter(raw: Option<&str>) -> NoteResult<u64> {
    match raw {
        None => Ok(0),
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| NoteError::CorruptCounter(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_for_id() {
        let keys = NoteKeys::for_id(12);
        assert_eq!(keys.text, "12text");
        assert_eq!(keys.created_at, "12createdat");
        assert_eq!(keys.updated_at, "12updatedat");
        assert_ne!(NoteKeys::for_id(1).text, NoteKeys::for_id(11).text);
    }

    #[test]
    fn test_timestamp_encoding() {
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(encode_timestamp(ts), "1700000000");
        assert_eq!(decode_timestamp("k", "1700000000").unwrap(), ts);
    }

    #[test]
    fn test_decode_full_note() {
        let note = decode(
            4,
            RawNote {
                text: Some("buy milk".to_string()),
                created_at: Some("100".to_string()),
                updated_at: Some("200".to_string()),
            },
        )
        .unwrap();
        assert_eq!(note.id, 4);
        assert_eq!(note.text, "buy milk");
        assert_eq!(note.created_at.unwrap().timestamp(), 100);
        assert_eq!(note.updated_at.unwrap().timestamp(), 200);
    }

    #[test]
    fn test_decode_missing_text_is_not_found() {
        let err = decode(
            9,
            RawNote {
                text: None,
                created_at: Some("100".to_string()),
                updated_at: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, NoteError::NotFound(9)));
    }

    #[test]
    fn test_decode_missing_timestamps_are_unset() {
        let note = decode(
            1,
            RawNote {
                text: Some("x".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(note.created_at.is_none());
        assert!(note.updated_at.is_none());
    }

    #[test]
    fn test_decode_corrupt_timestamp() {
        let err = decode(
            2,
            RawNote {
                text: Some("x".to_string()),
                created_at: Some("100".to_string()),
                updated_at: Some("yesterday".to_string()),
            },
        )
        .unwrap_err();
        match err {
            NoteError::Decode { key, value } => {
                assert_eq!(key, "2updatedat");
                assert_eq!(value, "yesterday");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_counter() {
        assert_eq!(decode_counter(None).unwrap(), 0);
        assert_eq!(decode_counter(Some("17")).unwrap(), 17);
        assert!(matches!(decode_counter(Some("-1")), Err(NoteError::CorruptCounter(_))));
        assert!(matches!(decode_counter(Some(" 3")), Err(NoteError::CorruptCounter(_))));
    }

    #[test]
    fn test_padded_timestamp_is_corrupt() {
        assert!(matches!(
            decode_timestamp("1createdat", " 100 "),
            Err(NoteError::Decode { .. })
        ));
        assert!(decode_timestamp("1createdat", "100\n").is_err());
    }
}
