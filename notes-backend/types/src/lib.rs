//! Shared types for the notes service and its HTTP clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =====================================================
// Domain Types
// =====================================================

/// A stored note, recomposed from its per-field store entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub text: String,
    /// Unset only for records written by an update of an id that was never created.
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Field a note listing can be ordered by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortField {
    Id,
    Text,
    CreatedAt,
    UpdatedAt,
}

// =====================================================
// Request Types
// =====================================================

/// Body of `POST /note`
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub text: String,
}

/// Body of `PUT /note/{id}`
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub text: String,
}

/// Query string of `GET /note`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ListNotesQuery {
    pub order_by: Option<String>,
}

// =====================================================
// Response Types
// =====================================================

/// Returned by `POST /note` with status 201
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedNote {
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}
