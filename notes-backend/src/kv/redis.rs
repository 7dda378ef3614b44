//! Redis-backed store using a multiplexed, auto-reconnecting connection.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::{KvStore, StoreError, StoreResult};

pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to the server at `url` (e.g. `redis://127.0.0.1:6379/0`).
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        log::info!("[KV] Connected to redis at {}", url);
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(key, 1).await.map_err(|e| {
            if is_not_an_integer(&e) {
                StoreError::NotAnInteger(key.to_string())
            } else {
                StoreError::Redis(e)
            }
        })?;
        Ok(value)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// INCR on a non-numeric value answers `ERR value is not an integer or out of range`.
fn is_not_an_integer(err: &redis::RedisError) -> bool {
    err.kind() == redis::ErrorKind::ResponseError
        && err.detail().is_some_and(|d| d.contains("not an integer"))
}
