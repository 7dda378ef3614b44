//! Notes REST API.
//!
//! Thin translation between HTTP and the repository: parse the request, run
//! one repository call under a per-request deadline, map the error class to
//! a status code.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use notes_types::{CreateNoteRequest, CreatedNote, ErrorBody, ListNotesQuery, UpdateNoteRequest};
use std::sync::Arc;

use crate::http::AppState;
use crate::notes::{ErrorKind, NoteError, RequestContext, ordering};

fn error_response(err: &NoteError) -> Response {
    let status = match (err, err.kind()) {
        (NoteError::EmptyText, _) => StatusCode::UNPROCESSABLE_ENTITY,
        (NoteError::Timeout | NoteError::Cancelled, _) => StatusCode::GATEWAY_TIMEOUT,
        (_, ErrorKind::Validation) => StatusCode::BAD_REQUEST,
        (_, ErrorKind::NotFound) => StatusCode::NOT_FOUND,
        (_, ErrorKind::Decode) => StatusCode::INTERNAL_SERVER_ERROR,
        (_, ErrorKind::Transport) => StatusCode::SERVICE_UNAVAILABLE,
    };

    match err.kind() {
        ErrorKind::Decode | ErrorKind::Transport => log::error!("[HTTP] {}", err),
        ErrorKind::Validation | ErrorKind::NotFound => log::debug!("[HTTP] {}", err),
    }

    (status, Json(ErrorBody::new(err.to_string()))).into_response()
}

fn bad_request(msg: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(msg))).into_response()
}

fn unprocessable(rejection: JsonRejection) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorBody::new(rejection.body_text())),
    )
        .into_response()
}

/// Note ids in paths are positive integers.
fn parse_id(raw: &str) -> Result<u64, Response> {
    match raw.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(bad_request(format!("invalid note id: {:?}", raw))),
    }
}

fn request_context(state: &AppState) -> RequestContext {
    RequestContext::with_timeout(state.store_timeout).with_cancel(state.shutdown.child_token())
}

// POST /note
pub async fn create_note(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return unprocessable(rejection),
    };

    match state.repo.create(&request_context(&state), &req.text).await {
        Ok(id) => (StatusCode::CREATED, Json(CreatedNote { id })).into_response(),
        Err(e) => error_response(&e),
    }
}

// GET /note?order_by=<field>
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListNotesQuery>,
) -> Response {
    // Reject a bad field before touching the store.
    let field = match query.order_by.as_deref().map(ordering::parse_sort_field) {
        Some(Ok(field)) => Some(field),
        Some(Err(e)) => return error_response(&e),
        None => None,
    };

    let mut notes = match state.repo.list_all(&request_context(&state)).await {
        Ok(notes) => notes,
        Err(e) => return error_response(&e),
    };

    if let Some(field) = field {
        if let Err(e) = ordering::sort_by(field, &mut notes) {
            return error_response(&e);
        }
    }

    (StatusCode::OK, Json(notes)).into_response()
}

// GET /note/{id}
pub async fn get_note(State(state): State<Arc<AppState>>, Path(raw_id): Path<String>) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.repo.get(&request_context(&state), id).await {
        Ok(note) => (StatusCode::OK, Json(note)).into_response(),
        Err(e) => error_response(&e),
    }
}

// PUT /note/{id}
pub async fn update_note(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    body: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return unprocessable(rejection),
    };

    match state.repo.update(&request_context(&state), id, &req.text).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_response(&e),
    }
}

// DELETE /note/{id}
pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Response {
    let id = match parse_id(&raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match state.repo.delete(&request_context(&state), id).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_response(&e),
    }
}
