use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::constants::TIME_LIMIT_SECONDS;
use crate::game::models::{AnswerChoice, Comment, DailyChallenge, Difficulty, PlayerAnswer};
use crate::game::score::{round_score, tally};

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("this round has already been answered")]
    AlreadyAnswered,

    #[error("the current round has not been answered yet")]
    AwaitingAnswer,

    #[error("the game is already complete")]
    Complete,
}

/// What the player gets to see for the round in play. The correct topic is
/// deliberately absent until they commit an answer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub round_index: usize,
    pub total_rounds: usize,
    pub difficulty: Difficulty,
    pub comments: Vec<Comment>,
    pub options: Vec<String>,
    pub time_limit_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub timed_out: bool,
    pub correct_topic: String,
    pub round_score: i64,
    pub running_total: i64,
}

pub enum Advance {
    Next(RoundView),
    Complete,
}

/// One player's run through the day's challenge.
///
/// Answer recording is single-assignment per round: whichever of the manual
/// answer or the timeout arrives first wins, and the loser is a no-op. An
/// abandoned session is simply dropped; nothing is persisted until the
/// completion flow runs.
pub struct GameSession {
    pub id: Uuid,
    pub user_id: String,
    pub username: String,
    pub date: String,
    challenge: DailyChallenge,
    answers: Vec<PlayerAnswer>,
    current: usize,
    round_started: DateTime<Utc>,
    streak_at_start: u32,
}

impl GameSession {
    pub fn new(
        user_id: &str,
        username: &str,
        date: &str,
        challenge: DailyChallenge,
        streak_at_start: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: String::from(user_id),
            username: String::from(username),
            date: String::from(date),
            challenge,
            answers: Vec::new(),
            current: 0,
            round_started: Utc::now(),
            streak_at_start,
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak_at_start
    }

    pub fn answers(&self) -> &[PlayerAnswer] {
        &self.answers
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.challenge.rounds.len()
    }

    fn current_answered(&self) -> bool {
        self.answers.len() > self.current
    }

    pub fn round_view(&self) -> Option<RoundView> {
        let round = self.challenge.rounds.get(self.current)?;
        Some(RoundView {
            round_index: self.current,
            total_rounds: self.challenge.rounds.len(),
            difficulty: round.difficulty,
            comments: round.comments.clone(),
            options: round.options.clone(),
            time_limit_seconds: TIME_LIMIT_SECONDS,
        })
    }

    /// Record the player's choice for the round in play.
    pub fn answer(&mut self, choice: AnswerChoice) -> Result<AnswerFeedback, SessionError> {
        self.answer_at(choice, Utc::now())
    }

    /// Timer-expiry path. Idempotent with [`Self::answer`]: if a manual
    /// answer already landed this does nothing.
    pub fn force_timeout(&mut self) -> Option<AnswerFeedback> {
        self.answer_at(AnswerChoice::Timeout, Utc::now()).ok()
    }

    fn answer_at(
        &mut self,
        choice: AnswerChoice,
        now: DateTime<Utc>,
    ) -> Result<AnswerFeedback, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Complete);
        }
        if self.current_answered() {
            return Err(SessionError::AlreadyAnswered);
        }

        let elapsed = (now - self.round_started).num_seconds().max(0) as u32;

        // a pick that arrives past the limit lost the race to the timer
        let selected = if elapsed >= TIME_LIMIT_SECONDS {
            AnswerChoice::Timeout
        } else {
            choice
        };
        let time_taken = elapsed.min(TIME_LIMIT_SECONDS);

        let round = &self.challenge.rounds[self.current];
        let is_correct = matches!(&selected, AnswerChoice::Picked(t) if *t == round.correct_topic);

        self.answers.push(PlayerAnswer {
            round_index: self.current,
            selected,
            time_taken_seconds: time_taken,
            is_correct,
        });

        let (running_total, _) = tally(&self.answers);
        Ok(AnswerFeedback {
            is_correct,
            timed_out: matches!(self.answers[self.current].selected, AnswerChoice::Timeout),
            correct_topic: round.correct_topic.clone(),
            round_score: round_score(is_correct, time_taken),
            running_total,
        })
    }

    /// Move past an answered round: either the next round's view or the end
    /// of the game.
    pub fn advance(&mut self) -> Result<Advance, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Complete);
        }
        if !self.current_answered() {
            return Err(SessionError::AwaitingAnswer);
        }

        self.current += 1;
        self.round_started = Utc::now();

        match self.round_view() {
            Some(view) => Ok(Advance::Next(view)),
            None => Ok(Advance::Complete),
        }
    }
}
