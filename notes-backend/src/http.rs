//! Router assembly and shared handler state.

use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::controllers::{health, notes};
use crate::kv::KvStore;
use crate::notes::NoteRepository;

pub struct AppState {
    pub repo: NoteRepository,
    /// Budget for the store round-trips of a single request
    pub store_timeout: Duration,
    pub store_backend: &'static str,
    pub started_at: Instant,
    /// Cancelled on shutdown; every request context holds a child of it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(store: Arc<dyn KvStore>, store_timeout: Duration) -> Self {
        Self {
            store_backend: store.backend_name(),
            repo: NoteRepository::new(store),
            store_timeout,
            started_at: Instant::now(),
            shutdown: CancellationToken::new(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/note", get(notes::list_notes).post(notes::create_note))
        .route(
            "/note/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route("/api/health", get(health::health_check))
        .route("/api/version", get(health::get_version))
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
        .layer(CorsLayer::permissive())
}

/// Access log line per request, in the spirit of actix's `Logger`.
async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let resp = next.run(req).await;

    log::info!(
        "[HTTP] {} {} -> {} ({} ms)",
        method,
        path,
        resp.status().as_u16(),
        start.elapsed().as_millis()
    );
    resp
}
