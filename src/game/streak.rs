use std::sync::Arc;

use tracing::{instrument, warn};

use crate::constants::{PLAYED_FLAG_TTL, STREAK_TTL};
use crate::db::{GameStore, StoreKey};
use crate::game::models::StreakRecord;
use crate::util::clock::day_before;

/// Play-gating and day-over-day streak continuity.
///
/// Reads degrade to defaults (not played, streak 0) when the store misbehaves
/// so a flaky backend never blocks a session; failed writes are logged and
/// the game simply loses persistence for that player.
pub struct StreakTracker {
    store: Arc<dyn GameStore>,
}

impl StreakTracker {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn has_played(&self, user_id: &str, date: &str) -> bool {
        let key = String::from(StoreKey::Played { user: user_id, date });
        match self.store.get(&key).await {
            Ok(flag) => flag.is_some(),
            Err(e) => {
                warn!(error = %e, user_id, "play flag read failed, assuming not played");
                false
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn load(&self, user_id: &str) -> StreakRecord {
        let key = String::from(StoreKey::Streak(user_id));
        match self.store.get(&key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, user_id, "corrupt streak record, starting fresh");
                StreakRecord::default()
            }),
            Ok(None) => StreakRecord::default(),
            Err(e) => {
                warn!(error = %e, user_id, "streak read failed, using defaults");
                StreakRecord::default()
            }
        }
    }

    /// The one mutation point: marks today played and rolls the streak.
    /// Consecutive-day completions extend it; any gap resets to 1.
    #[instrument(skip(self))]
    pub async fn record_completion(&self, user_id: &str, date: &str) -> StreakRecord {
        let prior = self.load(user_id).await;

        let continued = day_before(date)
            .is_some_and(|yesterday| prior.last_played_date == yesterday);
        let current = if continued { prior.current_streak + 1 } else { 1 };

        let record = StreakRecord {
            current_streak: current,
            longest_streak: current.max(prior.longest_streak),
            last_played_date: String::from(date),
            total_games_played: prior.total_games_played + 1,
        };

        let streak_key = String::from(StoreKey::Streak(user_id));
        match serde_json::to_string(&record) {
            Ok(raw) => {
                if let Err(e) = self.store.set(&streak_key, &raw, Some(STREAK_TTL)).await {
                    warn!(error = %e, user_id, "streak write failed");
                }
            }
            Err(e) => warn!(error = %e, user_id, "streak serialization failed"),
        }

        let played_key = String::from(StoreKey::Played { user: user_id, date });
        if let Err(e) = self.store.set(&played_key, "1", Some(PLAYED_FLAG_TTL)).await {
            warn!(error = %e, user_id, "play flag write failed");
        }

        record
    }
}
