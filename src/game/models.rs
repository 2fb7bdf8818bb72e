use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub score: i64,
    pub text: String,
}

/// One guess-the-topic question: a few comments, four options, one of which
/// is where the comments actually came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub correct_topic: String,
    pub options: Vec<String>,
    pub comments: Vec<Comment>,
    pub difficulty: Difficulty,
}

/// The five rounds every player sees on a given date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallenge {
    pub date: String,
    pub rounds: Vec<Round>,
    pub created_at: i64,
}

/// What the player did on one round. `Timeout` is a distinct variant, so it
/// can never compare equal to a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerChoice {
    Picked(String),
    Timeout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAnswer {
    pub round_index: usize,
    pub selected: AnswerChoice,
    pub time_taken_seconds: u32,
    pub is_correct: bool,
}

/// Completed-game snapshot, written once per player per date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScore {
    pub user_id: String,
    pub username: String,
    pub answers: Vec<PlayerAnswer>,
    pub total_score: i64,
    pub correct_count: u32,
    pub date: String,
    pub streak: u32,
    pub completed_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_played_date: String,
    pub total_games_played: u32,
}

/// Lifetime counters per player, kept as a store hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub total_games: u32,
    pub total_score: i64,
    pub high_score: i64,
    pub last_played_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub username: String,
    pub score: i64,
    pub correct_count: u32,
    pub streak: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
}
