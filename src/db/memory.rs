use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::db::store::{GameStore, StoreResult};

struct Entry<T> {
    value: T,
    expires_at: Option<Instant>,
}

impl<T> Entry<T> {
    fn new(value: T, ttl_seconds: Option<u64>) -> Self {
        Self {
            value,
            expires_at: ttl_seconds.map(|s| Instant::now() + Duration::from_secs(s)),
        }
    }

    fn live(&self) -> bool {
        self.expires_at.is_none_or(|at| Instant::now() < at)
    }
}

#[derive(Default)]
struct Tables {
    strings: HashMap<String, Entry<String>>,
    // ranked sets keep insertion order; ties stay in arrival order on reads
    sorted: HashMap<String, Entry<Vec<(String, i64)>>>,
    hashes: HashMap<String, Entry<HashMap<String, String>>>,
}

impl Tables {
    fn purge(&mut self) {
        self.strings.retain(|_, e| e.live());
        self.sorted.retain(|_, e| e.live());
        self.hashes.retain(|_, e| e.live());
    }
}

/// In-memory store: the test double, and the degraded mode the server falls
/// back to when no Redis is reachable (state then lives only as long as the
/// process).
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = len as isize;
    let mut start = if start < 0 { len + start } else { start };
    let mut stop = if stop < 0 { len + stop } else { stop };
    start = start.max(0);
    stop = stop.min(len - 1);
    if start > stop || len == 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

fn ranked_desc(members: &[(String, i64)]) -> Vec<(String, i64)> {
    let mut ranked = members.to_vec();
    // stable sort: equal scores keep insertion order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut tables = self.tables.lock().await;
        tables.purge();
        Ok(tables.strings.get(key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables
            .strings
            .insert(key.to_string(), Entry::new(value.to_string(), ttl_seconds));
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        tables.purge();
        if tables.strings.contains_key(key) {
            return Ok(false);
        }
        tables
            .strings
            .insert(key.to_string(), Entry::new(value.to_string(), Some(ttl_seconds)));
        Ok(true)
    }

    async fn zadd(&self, key: &str, member: &str, score: i64) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables.purge();
        let entry = tables
            .sorted
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Vec::new(), None));
        match entry.value.iter_mut().find(|(m, _)| m == member) {
            Some(existing) => existing.1 = score,
            None => entry.value.push((member.to_string(), score)),
        }
        Ok(())
    }

    async fn zrange_desc(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> StoreResult<Vec<(String, i64)>> {
        let mut tables = self.tables.lock().await;
        tables.purge();
        let Some(entry) = tables.sorted.get(key) else {
            return Ok(Vec::new());
        };
        let ranked = ranked_desc(&entry.value);
        let Some((start, stop)) = resolve_range(ranked.len(), start, stop) else {
            return Ok(Vec::new());
        };
        Ok(ranked[start..=stop].to_vec())
    }

    async fn ztrim_to_top(&self, key: &str, keep: usize) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        let Some(entry) = tables.sorted.get_mut(key) else {
            return Ok(());
        };
        if entry.value.len() <= keep {
            return Ok(());
        }
        let survivors: Vec<String> = ranked_desc(&entry.value)
            .into_iter()
            .take(keep)
            .map(|(m, _)| m)
            .collect();
        entry.value.retain(|(m, _)| survivors.contains(m));
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> StoreResult<()> {
        let deadline = Some(Instant::now() + Duration::from_secs(ttl_seconds));
        let mut tables = self.tables.lock().await;
        if let Some(e) = tables.strings.get_mut(key) {
            e.expires_at = deadline;
        }
        if let Some(e) = tables.sorted.get_mut(key) {
            e.expires_at = deadline;
        }
        if let Some(e) = tables.hashes.get_mut(key) {
            e.expires_at = deadline;
        }
        Ok(())
    }

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        tables.purge();
        let entry = tables
            .hashes
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(HashMap::new(), None));
        for (field, value) in fields {
            entry.value.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        let mut tables = self.tables.lock().await;
        tables.purge();
        Ok(tables
            .hashes
            .get(key)
            .map(|e| e.value.clone())
            .unwrap_or_default())
    }
}
