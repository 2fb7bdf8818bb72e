use crate::constants::{BASE_POINTS, TIME_BONUS_PER_SECOND, TIME_LIMIT_SECONDS};
use crate::game::models::PlayerAnswer;

/// Points for one round: base plus a bonus for every unspent second, nothing
/// for a wrong answer or a timeout.
pub fn round_score(is_correct: bool, time_taken_seconds: u32) -> i64 {
    if !is_correct {
        return 0;
    }

    let remaining = i64::from(TIME_LIMIT_SECONDS) - i64::from(time_taken_seconds);
    BASE_POINTS + (remaining * TIME_BONUS_PER_SECOND).max(0)
}

/// Total score and correct count over a finished game's answers.
pub fn tally(answers: &[PlayerAnswer]) -> (i64, u32) {
    let total = answers
        .iter()
        .map(|a| round_score(a.is_correct, a.time_taken_seconds))
        .sum();
    let correct = answers.iter().filter(|a| a.is_correct).count() as u32;

    (total, correct)
}
