use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::constants::SCORE_TTL;
use crate::db::{GameStore, StoreKey};
use crate::game::leaderboard::Leaderboard;
use crate::game::models::{DailyChallenge, LeaderboardEntry, PlayerScore, PlayerStats, StreakRecord};
use crate::game::score::tally;
use crate::game::session::GameSession;
use crate::game::stats::StatsRepository;
use crate::game::streak::StreakTracker;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("today's challenge has already been played")]
    AlreadyPlayed,

    #[error("the game is not finished yet")]
    NotFinished,
}

/// Ties the trackers together: gate on start, everything else on completion.
pub struct GameEngine {
    store: Arc<dyn GameStore>,
    streaks: StreakTracker,
    stats: StatsRepository,
    leaderboard: Leaderboard,
}

impl GameEngine {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self {
            streaks: StreakTracker::new(Arc::clone(&store)),
            stats: StatsRepository::new(Arc::clone(&store)),
            leaderboard: Leaderboard::new(Arc::clone(&store)),
            store,
        }
    }

    /// Start a session for `date`, unless the player already completed one.
    #[instrument(skip(self, challenge))]
    pub async fn start(
        &self,
        user_id: &str,
        username: &str,
        date: &str,
        challenge: DailyChallenge,
    ) -> Result<GameSession, EngineError> {
        if self.streaks.has_played(user_id, date).await {
            return Err(EngineError::AlreadyPlayed);
        }

        let streak = self.streaks.load(user_id).await.current_streak;
        Ok(GameSession::new(user_id, username, date, challenge, streak))
    }

    /// The single completion point: scores the finished session, rolls the
    /// streak, snapshots the result, updates lifetime stats, and puts the
    /// score on the day's leaderboard. Persistence failures downgrade to
    /// warnings; the player still gets their result.
    #[instrument(skip(self, session), fields(user_id = %session.user_id, date = %session.date))]
    pub async fn complete(&self, session: &GameSession) -> Result<PlayerScore, EngineError> {
        if !session.is_complete() {
            return Err(EngineError::NotFinished);
        }
        // a second session finishing the same day must not re-fire
        if self.streaks.has_played(&session.user_id, &session.date).await {
            return Err(EngineError::AlreadyPlayed);
        }

        let (total_score, correct_count) = tally(session.answers());
        let record = self
            .streaks
            .record_completion(&session.user_id, &session.date)
            .await;

        let score = PlayerScore {
            user_id: session.user_id.clone(),
            username: session.username.clone(),
            answers: session.answers().to_vec(),
            total_score,
            correct_count,
            date: session.date.clone(),
            streak: record.current_streak,
            completed_at: Utc::now().timestamp(),
        };

        let score_key = String::from(StoreKey::Score {
            user: &session.user_id,
            date: &session.date,
        });
        match serde_json::to_string(&score) {
            Ok(raw) => {
                if let Err(e) = self.store.set(&score_key, &raw, Some(SCORE_TTL)).await {
                    warn!(error = %e, "score snapshot write failed");
                }
            }
            Err(e) => warn!(error = %e, "score snapshot serialization failed"),
        }

        self.stats
            .record_game(&session.user_id, total_score, &session.date)
            .await;

        let entry = LeaderboardEntry {
            username: session.username.clone(),
            score: total_score,
            correct_count,
            streak: record.current_streak,
        };
        if let Err(e) = self.leaderboard.submit(&session.date, &entry).await {
            warn!(error = %e, "leaderboard submit failed");
        }

        info!(total_score, correct_count, streak = record.current_streak, "game completed");
        Ok(score)
    }

    pub async fn streak_of(&self, user_id: &str) -> StreakRecord {
        self.streaks.load(user_id).await
    }

    pub async fn stats_of(&self, user_id: &str) -> PlayerStats {
        self.stats.load(user_id).await
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::{DIFFICULTY_SLOTS, ROUNDS_PER_DAY};
    use crate::db::MemoryStore;
    use crate::game::models::{AnswerChoice, Comment, Round};

    fn challenge(date: &str) -> DailyChallenge {
        DailyChallenge {
            date: String::from(date),
            rounds: (0..ROUNDS_PER_DAY)
                .map(|i| Round {
                    correct_topic: String::from("gaming"),
                    options: vec![
                        String::from("gaming"),
                        String::from("movies"),
                        String::from("music"),
                        String::from("sports"),
                    ],
                    comments: vec![Comment {
                        author: String::from("a"),
                        score: 4,
                        text: String::from("a comment that is long enough"),
                    }],
                    difficulty: DIFFICULTY_SLOTS[i],
                })
                .collect(),
            created_at: 0,
        }
    }

    async fn play_through(engine: &GameEngine, date: &str, correct_rounds: usize) -> PlayerScore {
        let mut session = engine
            .start("t2_a", "alice", date, challenge(date))
            .await
            .unwrap();

        for i in 0..ROUNDS_PER_DAY {
            if i < correct_rounds {
                session.answer(AnswerChoice::Picked(String::from("gaming"))).unwrap();
            } else {
                session.force_timeout().unwrap();
            }
            session.advance().unwrap();
        }

        engine.complete(&session).await.unwrap()
    }

    #[tokio::test]
    async fn completion_persists_score_streak_stats_and_leaderboard() {
        let store: Arc<dyn GameStore> = Arc::new(MemoryStore::new());
        let engine = GameEngine::new(Arc::clone(&store));

        let score = play_through(&engine, "2025-06-15", 3).await;
        assert_eq!(score.correct_count, 3);
        assert_eq!(score.streak, 1);

        let snapshot = store
            .get(&String::from(StoreKey::Score { user: "t2_a", date: "2025-06-15" }))
            .await
            .unwrap()
            .expect("snapshot written");
        let parsed: PlayerScore = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(parsed.total_score, score.total_score);

        assert_eq!(engine.streak_of("t2_a").await.current_streak, 1);
        assert_eq!(engine.stats_of("t2_a").await.total_games, 1);

        let board = engine.leaderboard().top_n("2025-06-15", 10).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].entry.score, score.total_score);
    }

    #[tokio::test]
    async fn second_start_same_day_is_rejected_and_state_untouched() {
        let store: Arc<dyn GameStore> = Arc::new(MemoryStore::new());
        let engine = GameEngine::new(Arc::clone(&store));

        let first = play_through(&engine, "2025-06-15", 5).await;

        let denied = engine
            .start("t2_a", "alice", "2025-06-15", challenge("2025-06-15"))
            .await;
        assert_eq!(denied.err(), Some(EngineError::AlreadyPlayed));

        // nothing about the first run changed
        assert_eq!(engine.streak_of("t2_a").await.current_streak, first.streak);
        let snapshot = store
            .get(&String::from(StoreKey::Score { user: "t2_a", date: "2025-06-15" }))
            .await
            .unwrap()
            .unwrap();
        let parsed: PlayerScore = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(parsed.total_score, first.total_score);
    }

    #[tokio::test]
    async fn a_stale_session_cannot_complete_twice_in_one_day() {
        let store: Arc<dyn GameStore> = Arc::new(MemoryStore::new());
        let engine = GameEngine::new(Arc::clone(&store));

        // two sessions started before either finishes
        let mut first = engine
            .start("t2_a", "alice", "2025-06-15", challenge("2025-06-15"))
            .await
            .unwrap();
        let mut second = engine
            .start("t2_a", "alice", "2025-06-15", challenge("2025-06-15"))
            .await
            .unwrap();

        for _ in 0..ROUNDS_PER_DAY {
            first.force_timeout().unwrap();
            first.advance().unwrap();
            second.force_timeout().unwrap();
            second.advance().unwrap();
        }

        assert!(engine.complete(&first).await.is_ok());
        assert_eq!(
            engine.complete(&second).await.err(),
            Some(EngineError::AlreadyPlayed)
        );
        assert_eq!(engine.stats_of("t2_a").await.total_games, 1);
    }

    #[tokio::test]
    async fn unfinished_session_cannot_complete() {
        let engine = GameEngine::new(Arc::new(MemoryStore::new()));
        let session = engine
            .start("t2_a", "alice", "2025-06-15", challenge("2025-06-15"))
            .await
            .unwrap();

        assert_eq!(engine.complete(&session).await.err(), Some(EngineError::NotFinished));
    }

    #[tokio::test]
    async fn day_over_day_streak_accumulates_through_the_engine() {
        let engine = GameEngine::new(Arc::new(MemoryStore::new()));

        assert_eq!(play_through(&engine, "2025-06-15", 5).await.streak, 1);
        assert_eq!(play_through(&engine, "2025-06-16", 5).await.streak, 2);
        assert_eq!(play_through(&engine, "2025-06-19", 5).await.streak, 1);
    }
}
