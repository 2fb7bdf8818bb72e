use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

pub type StoreResult<T> = core::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis client error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The narrow key-value surface the game relies on.
///
/// All values are JSON text (or hash fields of plain strings); the ranked-set
/// operations carry an integer score. Implementations must give per-key
/// atomicity for each single call, nothing more.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Set `key`, optionally with a TTL in seconds.
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> StoreResult<()>;

    /// Set `key` only if absent. Returns whether the write happened.
    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<bool>;

    /// Upsert `member` into the ranked set at `key` with `score`.
    async fn zadd(&self, key: &str, member: &str, score: i64) -> StoreResult<()>;

    /// Members with scores, ranked by score descending. `start`/`stop` are
    /// inclusive ranks; negative indices count from the end.
    async fn zrange_desc(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> StoreResult<Vec<(String, i64)>>;

    /// Drop every member ranked below the top `keep` by score.
    async fn ztrim_to_top(&self, key: &str, keep: usize) -> StoreResult<()>;

    async fn expire(&self, key: &str, ttl_seconds: u64) -> StoreResult<()>;

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> StoreResult<()>;

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>>;
}
