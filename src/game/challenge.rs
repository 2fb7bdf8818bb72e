use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

use crate::constants::{
    COMMENT_FETCH_LIMIT, DEFAULT_WINDOW, DIFFICULTY_SLOTS, MIN_POST_COMMENTS, MIN_USABLE_COMMENTS,
    POST_FETCH_LIMIT, ROUNDS_PER_DAY,
};
use crate::content::filter::filter_comments;
use crate::content::{ContentError, ContentResult, ContentSource, RawPost};
use crate::game::models::{DailyChallenge, Difficulty, Round};
use crate::game::topics::TopicPool;

/// Builds one day's worth of rounds, one per difficulty slot.
///
/// Each round is sourced live when possible and swapped for an offline-bank
/// question when anything along the way fails. Group and topic selection is
/// uniform; option order is a Fisher-Yates shuffle.
pub struct ChallengeGenerator {
    source: Arc<dyn ContentSource>,
    pool: TopicPool,
}

impl ChallengeGenerator {
    pub fn new(source: Arc<dyn ContentSource>, pool: TopicPool) -> Self {
        Self { source, pool }
    }

    #[instrument(skip(self))]
    pub async fn generate(&self, date: &str) -> DailyChallenge {
        let mut used: Vec<String> = Vec::new();
        let mut rounds: Vec<Round> = Vec::with_capacity(ROUNDS_PER_DAY);

        for slot in DIFFICULTY_SLOTS {
            let round = match self.live_round(slot, &used).await {
                Ok(round) => round,
                Err(e) => {
                    debug!(difficulty = ?slot, error = %e, "live round failed, drawing from offline bank");
                    self.fallback_round(slot)
                }
            };

            used.push(round.correct_topic.clone());
            rounds.push(round);
        }

        DailyChallenge {
            date: String::from(date),
            rounds,
            created_at: Utc::now().timestamp(),
        }
    }

    /// A full challenge straight from the offline bank, no remote calls.
    pub fn fallback_challenge(&self, date: &str) -> DailyChallenge {
        DailyChallenge {
            date: String::from(date),
            rounds: DIFFICULTY_SLOTS
                .into_iter()
                .map(|slot| self.fallback_round(slot))
                .collect(),
            created_at: Utc::now().timestamp(),
        }
    }

    async fn live_round(&self, difficulty: Difficulty, used: &[String]) -> ContentResult<Round> {
        let (correct_topic, options) = self.pick_topics(difficulty, used);

        let posts = self
            .source
            .top_posts(&correct_topic, DEFAULT_WINDOW, POST_FETCH_LIMIT)
            .await?;
        let viable: Vec<RawPost> = posts
            .into_iter()
            .filter(|p| p.num_comments >= MIN_POST_COMMENTS)
            .collect();
        if viable.is_empty() {
            return Err(ContentError::NoViablePosts(correct_topic));
        }

        let post = {
            let mut rng = rand::rng();
            viable[rng.random_range(0..viable.len())].clone()
        };

        let raw = self.source.top_comments(&post.id, COMMENT_FETCH_LIMIT).await?;
        let comments = filter_comments(&raw);
        if comments.len() < MIN_USABLE_COMMENTS {
            return Err(ContentError::NotEnoughUsable(comments.len()));
        }

        Ok(Round {
            correct_topic,
            options,
            comments,
            difficulty,
        })
    }

    /// Choose a group for the slot, preferring groups free of already-used
    /// answers, then a correct topic within it, and a shuffled option order.
    fn pick_topics(&self, difficulty: Difficulty, used: &[String]) -> (String, Vec<String>) {
        let groups = self.pool.groups(difficulty);
        let mut rng = rand::rng();

        let fresh: Vec<&_> = groups
            .iter()
            .filter(|g| !used.iter().any(|topic| g.contains(topic)))
            .collect();

        // every group exhausted: allow repeats rather than fail the slot
        let group = if fresh.is_empty() {
            &groups[rng.random_range(0..groups.len())]
        } else {
            fresh[rng.random_range(0..fresh.len())]
        };

        let topics = group.topics();
        let correct_topic = topics[rng.random_range(0..topics.len())].clone();

        let mut options = topics.to_vec();
        options.shuffle(&mut rng);

        (correct_topic, options)
    }

    fn fallback_round(&self, difficulty: Difficulty) -> Round {
        let bank = self.pool.fallback_bank();
        let mut rng = rand::rng();
        let question = &bank[rng.random_range(0..bank.len())];

        let mut options = question.options.clone();
        options.shuffle(&mut rng);

        Round {
            correct_topic: question.correct_topic.clone(),
            options,
            comments: question.comments.clone(),
            difficulty,
        }
    }
}
