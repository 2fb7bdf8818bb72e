use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, instrument};

use crate::db::store::{GameStore, StoreResult};

/// Redis-backed store over a shared [`ConnectionManager`].
///
/// The manager reconnects on its own; cloning it per call is how the redis
/// crate expects it to be used.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    #[instrument]
    pub async fn connect(redis_url: &str) -> StoreResult<Self> {
        debug!(redis_url, "connecting to redis server");

        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;

        Ok(Self { manager })
    }
}

#[async_trait]
impl GameStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> StoreResult<()> {
        let mut conn = self.manager.clone();
        match ttl_seconds {
            Some(ttl) => {
                let _: () = conn.set_ex(key, value, ttl).await?;
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<bool> {
        let mut conn = self.manager.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await?;

        Ok(reply.is_some())
    }

    async fn zadd(&self, key: &str, member: &str, score: i64) -> StoreResult<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.zadd(key, member, score).await?;
        Ok(())
    }

    async fn zrange_desc(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> StoreResult<Vec<(String, i64)>> {
        let mut conn = self.manager.clone();
        let members: Vec<(String, i64)> = conn.zrevrange_withscores(key, start, stop).await?;
        Ok(members)
    }

    async fn ztrim_to_top(&self, key: &str, keep: usize) -> StoreResult<()> {
        let mut conn = self.manager.clone();
        // ascending ranks: everything below the top `keep` scores
        let _: () = conn
            .zremrangebyrank(key, 0, -(keep as isize) - 1)
            .await?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> StoreResult<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.expire(key, ttl_seconds as i64).await?;
        Ok(())
    }

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> StoreResult<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.hset_multiple(key, fields).await?;
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        let mut conn = self.manager.clone();
        let map: HashMap<String, String> = conn.hgetall(key).await?;
        Ok(map)
    }
}
