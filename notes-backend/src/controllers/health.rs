use axum::Json;
use axum::extract::State;
use std::sync::Arc;

use crate::http::AppState;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// GET /api/health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": VERSION,
        "store": state.store_backend,
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}

// GET /api/version
pub async fn get_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": VERSION
    }))
}
