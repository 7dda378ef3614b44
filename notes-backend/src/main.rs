//! Notes service: CRUD over HTTP backed by a key-value store.
//!
//! Default: http://0.0.0.0:1234/note (redis at redis://127.0.0.1:6379/0)

use notes_backend::config::{Config, StoreBackend};
use notes_backend::http::{self, AppState};
use notes_backend::kv::{KvStore, MemoryStore, RedisStore};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let store: Arc<dyn KvStore> = match config.store {
        StoreBackend::Redis => match RedisStore::connect(&config.redis_url).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                log::error!("Failed to connect to redis at {}: {}", config.redis_url, e);
                std::process::exit(1);
            }
        },
        StoreBackend::Memory => {
            log::warn!("Using the in-memory store; notes are lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    log::info!(
        "Store backend: {} (timeout {} ms per request)",
        config.store.as_str(),
        config.store_timeout.as_millis()
    );

    let state = Arc::new(AppState::new(store, config.store_timeout));
    let shutdown = state.shutdown.clone();
    let app = http::router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");
    log::info!("Notes service listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .expect("Server error");

    log::info!("Notes service stopped");
}

/// Resolves on Ctrl-C after cancelling in-flight store calls.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
    shutdown.cancel();
}
