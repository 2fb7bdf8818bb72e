use crate::game::models::Difficulty;

pub const ROUNDS_PER_DAY: usize = 5;
pub const OPTIONS_PER_ROUND: usize = 4;
pub const TIME_LIMIT_SECONDS: u32 = 60;

pub const BASE_POINTS: i64 = 100;
pub const TIME_BONUS_PER_SECOND: i64 = 2;

/// Slot order for one day's rounds.
pub const DIFFICULTY_SLOTS: [Difficulty; ROUNDS_PER_DAY] = [
    Difficulty::Easy,
    Difficulty::Easy,
    Difficulty::Medium,
    Difficulty::Hard,
    Difficulty::Hard,
];

// Content retrieval
pub const REDDIT_BASE_URL: &str = "https://www.reddit.com";
pub const DEFAULT_USER_AGENT: &str = "sub-drift/0.1 (daily topic-guess game)";
pub const DEFAULT_WINDOW: &str = "month";
pub const POST_FETCH_LIMIT: usize = 25;
pub const COMMENT_FETCH_LIMIT: usize = 50;

/// A post with fewer top-level comments than this is not worth sampling.
pub const MIN_POST_COMMENTS: u32 = 10;

// Comment filtering: strict bounds, measured in characters
pub const COMMENT_MIN_CHARS: usize = 15;
pub const COMMENT_MAX_CHARS: usize = 400;
pub const COMMENT_DISPLAY_CHARS: usize = 250;
pub const MAX_COMMENTS_PER_ROUND: usize = 3;
pub const MIN_USABLE_COMMENTS: usize = 2;

pub const LEADERBOARD_KEEP: usize = 100;
pub const LEADERBOARD_DEFAULT_LIMIT: usize = 10;

pub const DAY_SECONDS: u64 = 86_400;
pub const CHALLENGE_TTL: u64 = DAY_SECONDS;
pub const GENERATION_MARKER_TTL: u64 = 120;
pub const PLAYED_FLAG_TTL: u64 = 2 * DAY_SECONDS;
pub const STREAK_TTL: u64 = 30 * DAY_SECONDS;
pub const SCORE_TTL: u64 = 30 * DAY_SECONDS;
pub const STATS_TTL: u64 = 365 * DAY_SECONDS;
pub const LEADERBOARD_TTL: u64 = 7 * DAY_SECONDS;

pub const SERVER_PORT: u16 = 3000;
