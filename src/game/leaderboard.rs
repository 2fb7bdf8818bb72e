use std::sync::Arc;

use tracing::{instrument, warn};

use crate::constants::{LEADERBOARD_KEEP, LEADERBOARD_TTL};
use crate::db::{GameStore, StoreKey, StoreResult};
use crate::game::models::{LeaderboardEntry, RankedEntry};

/// One ranked set per date, bounded to the top scores and expired after the
/// retention window.
pub struct Leaderboard {
    store: Arc<dyn GameStore>,
}

impl Leaderboard {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, entry), fields(username = %entry.username, score = entry.score))]
    pub async fn submit(&self, date: &str, entry: &LeaderboardEntry) -> StoreResult<()> {
        let key = String::from(StoreKey::Leaderboard(date));
        let member = serde_json::to_string(entry)?;

        self.store.zadd(&key, &member, entry.score).await?;
        self.store.ztrim_to_top(&key, LEADERBOARD_KEEP).await?;
        self.store.expire(&key, LEADERBOARD_TTL).await?;

        Ok(())
    }

    /// Top `limit` entries by score descending, ranked from 1.
    ///
    /// Ties fall back to the backing store's member ordering; no particular
    /// tie-break is promised. Members that no longer parse are skipped.
    #[instrument(skip(self))]
    pub async fn top_n(&self, date: &str, limit: usize) -> StoreResult<Vec<RankedEntry>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let key = String::from(StoreKey::Leaderboard(date));
        let members = self
            .store
            .zrange_desc(&key, 0, limit as isize - 1)
            .await?;

        Ok(members
            .into_iter()
            .filter_map(|(raw, _score)| match serde_json::from_str(&raw) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, date, "skipping unparseable leaderboard member");
                    None
                }
            })
            .enumerate()
            .map(|(idx, entry)| RankedEntry { rank: idx + 1, entry })
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::MemoryStore;

    fn entry(username: &str, score: i64) -> LeaderboardEntry {
        LeaderboardEntry {
            username: String::from(username),
            score,
            correct_count: 3,
            streak: 1,
        }
    }

    #[tokio::test]
    async fn entries_come_back_ordered_and_ranked() {
        let board = Leaderboard::new(Arc::new(MemoryStore::new()));
        board.submit("2025-06-15", &entry("alice", 50)).await.unwrap();
        board.submit("2025-06-15", &entry("bob", 90)).await.unwrap();
        board.submit("2025-06-15", &entry("carol", 70)).await.unwrap();

        let top = board.top_n("2025-06-15", 3).await.unwrap();
        let summary: Vec<(usize, &str, i64)> = top
            .iter()
            .map(|r| (r.rank, r.entry.username.as_str(), r.entry.score))
            .collect();

        assert_eq!(summary, vec![(1, "bob", 90), (2, "carol", 70), (3, "alice", 50)]);
    }

    #[tokio::test]
    async fn limit_caps_the_result() {
        let board = Leaderboard::new(Arc::new(MemoryStore::new()));
        for (name, score) in [("a", 10), ("b", 20), ("c", 30), ("d", 40)] {
            board.submit("2025-06-15", &entry(name, score)).await.unwrap();
        }

        let top = board.top_n("2025-06-15", 2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].entry.username, "d");
    }

    #[tokio::test]
    async fn dates_do_not_bleed_into_each_other() {
        let board = Leaderboard::new(Arc::new(MemoryStore::new()));
        board.submit("2025-06-15", &entry("alice", 50)).await.unwrap();
        board.submit("2025-06-16", &entry("bob", 90)).await.unwrap();

        let yesterday = board.top_n("2025-06-15", 10).await.unwrap();
        assert_eq!(yesterday.len(), 1);
        assert_eq!(yesterday[0].entry.username, "alice");
    }

    #[tokio::test]
    async fn bad_members_are_skipped_not_fatal() {
        let store: Arc<dyn GameStore> = Arc::new(MemoryStore::new());
        store
            .zadd(
                &String::from(StoreKey::Leaderboard("2025-06-15")),
                "not json at all",
                999,
            )
            .await
            .unwrap();

        let board = Leaderboard::new(Arc::clone(&store));
        board.submit("2025-06-15", &entry("alice", 50)).await.unwrap();

        let top = board.top_n("2025-06-15", 10).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].entry.username, "alice");
        assert_eq!(top[0].rank, 1);
    }
}
