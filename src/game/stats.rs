use std::sync::Arc;

use tracing::{instrument, warn};

use crate::constants::STATS_TTL;
use crate::db::{GameStore, StoreKey};
use crate::game::models::PlayerStats;

/// Lifetime per-player counters, kept as a store hash so individual fields
/// stay independently readable.
pub struct StatsRepository {
    store: Arc<dyn GameStore>,
}

impl StatsRepository {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn load(&self, user_id: &str) -> PlayerStats {
        let key = String::from(StoreKey::Stats(user_id));
        let fields = match self.store.hgetall(&key).await {
            Ok(fields) => fields,
            Err(e) => {
                warn!(error = %e, user_id, "stats read failed, using defaults");
                return PlayerStats::default();
            }
        };

        PlayerStats {
            total_games: parse_or_zero(fields.get("totalGames")),
            total_score: parse_or_zero(fields.get("totalScore")),
            high_score: parse_or_zero(fields.get("highScore")),
            last_played_date: fields.get("lastPlayedDate").cloned().unwrap_or_default(),
        }
    }

    #[instrument(skip(self))]
    pub async fn record_game(&self, user_id: &str, score: i64, date: &str) -> PlayerStats {
        let prior = self.load(user_id).await;
        let stats = PlayerStats {
            total_games: prior.total_games + 1,
            total_score: prior.total_score + score,
            high_score: prior.high_score.max(score),
            last_played_date: String::from(date),
        };

        let key = String::from(StoreKey::Stats(user_id));
        let fields = vec![
            (String::from("totalGames"), stats.total_games.to_string()),
            (String::from("totalScore"), stats.total_score.to_string()),
            (String::from("highScore"), stats.high_score.to_string()),
            (String::from("lastPlayedDate"), stats.last_played_date.clone()),
        ];

        if let Err(e) = self.store.hset(&key, &fields).await {
            warn!(error = %e, user_id, "stats write failed");
        } else if let Err(e) = self.store.expire(&key, STATS_TTL).await {
            warn!(error = %e, user_id, "stats expiry refresh failed");
        }

        stats
    }
}

fn parse_or_zero<T: std::str::FromStr + Default>(raw: Option<&String>) -> T {
    raw.and_then(|v| v.parse().ok()).unwrap_or_default()
}
