use std::collections::HashMap;

use crate::constants::OPTIONS_PER_ROUND;
use crate::game::models::{Comment, Difficulty};

/// A set of mutually-confusable topics; one becomes the answer, the rest
/// become decoys.
#[derive(Debug, Clone)]
pub struct TopicGroup {
    topics: Vec<String>,
}

impl TopicGroup {
    pub fn new(topics: [&str; OPTIONS_PER_ROUND]) -> Self {
        Self {
            topics: topics.iter().map(|t| String::from(*t)).collect(),
        }
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t == topic)
    }
}

/// An offline question: used whenever live content cannot be sourced.
#[derive(Debug, Clone)]
pub struct FallbackQuestion {
    pub correct_topic: String,
    pub options: Vec<String>,
    pub comments: Vec<Comment>,
}

/// Immutable pool configuration handed to the challenge generator: topic
/// groups bucketed by difficulty plus the offline bank.
#[derive(Debug, Clone)]
pub struct TopicPool {
    buckets: HashMap<Difficulty, Vec<TopicGroup>>,
    fallback: Vec<FallbackQuestion>,
}

impl TopicPool {
    pub fn new(buckets: HashMap<Difficulty, Vec<TopicGroup>>, fallback: Vec<FallbackQuestion>) -> Self {
        assert!(!fallback.is_empty(), "fallback bank must not be empty");
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert!(
                buckets.get(&difficulty).is_some_and(|groups| !groups.is_empty()),
                "every difficulty bucket needs at least one topic group"
            );
        }

        Self { buckets, fallback }
    }

    pub fn groups(&self, difficulty: Difficulty) -> &[TopicGroup] {
        // validated non-empty in `new`
        &self.buckets[&difficulty]
    }

    pub fn fallback_bank(&self) -> &[FallbackQuestion] {
        &self.fallback
    }

    /// The pool the binary ships with.
    pub fn builtin() -> Self {
        let mut buckets = HashMap::new();

        buckets.insert(
            Difficulty::Easy,
            vec![
                TopicGroup::new(["gaming", "movies", "music", "sports"]),
                TopicGroup::new(["cooking", "fitness", "travel", "photography"]),
                TopicGroup::new(["science", "technology", "history", "space"]),
            ],
        );
        buckets.insert(
            Difficulty::Medium,
            vec![
                TopicGroup::new(["pcgaming", "buildapc", "hardware", "laptops"]),
                TopicGroup::new(["programming", "webdev", "learnprogramming", "compsci"]),
                TopicGroup::new(["movies", "television", "documentaries", "truefilm"]),
            ],
        );
        buckets.insert(
            Difficulty::Hard,
            vec![
                TopicGroup::new(["coffee", "espresso", "tea", "barista"]),
                TopicGroup::new(["running", "marathon", "trailrunning", "ultrarunning"]),
                TopicGroup::new(["whisky", "bourbon", "scotch", "wine"]),
            ],
        );

        Self::new(buckets, builtin_fallback_bank())
    }
}

fn canned(author: &str, score: i64, text: &str) -> Comment {
    Comment {
        author: String::from(author),
        score,
        text: String::from(text),
    }
}

fn question(correct: &str, options: [&str; OPTIONS_PER_ROUND], comments: Vec<Comment>) -> FallbackQuestion {
    FallbackQuestion {
        correct_topic: String::from(correct),
        options: options.iter().map(|o| String::from(*o)).collect(),
        comments,
    }
}

fn builtin_fallback_bank() -> Vec<FallbackQuestion> {
    vec![
        question(
            "gaming",
            ["gaming", "movies", "technology", "sports"],
            vec![
                canned("pixel_pusher", 214, "Just finished this one last night and the ending completely floored me"),
                canned("couch_critic", 98, "Worth every cent, easily a hundred hours in and still finding secrets"),
                canned("retro_rei", 41, "The soundtrack alone carries half the experience for me"),
            ],
        ),
        question(
            "pcgaming",
            ["pcgaming", "buildapc", "gaming", "hardware"],
            vec![
                canned("frame_chaser", 156, "Anyone found decent settings for ultrawide? Stutters on anything above high"),
                canned("gpu_goblin", 77, "Runs way better after the latest driver update, night and day difference"),
            ],
        ),
        question(
            "technology",
            ["technology", "science", "programming", "space"],
            vec![
                canned("silicon_sam", 305, "Got my hands on the new model this week and the battery life claim actually holds up"),
                canned("late_adopter", 120, "Every generation they promise revolutionary and ship incremental, yet here I am upgrading again"),
            ],
        ),
        question(
            "programming",
            ["programming", "webdev", "compsci", "technology"],
            vec![
                canned("rustacean_dev", 188, "This implementation is surprisingly elegant once you see the recursion"),
                canned("null_checker", 64, "Spent three hours on a bug that turned out to be an off by one, classic"),
                canned("tab_enjoyer", 29, "Clean abstractions like this are why I still love reading other people's code"),
            ],
        ),
        question(
            "movies",
            ["movies", "television", "music", "documentaries"],
            vec![
                canned("third_act_problems", 241, "The cinematography in the final sequence deserves every award it gets"),
                canned("popcorn_purist", 87, "Went in with zero expectations and walked out having cried twice"),
            ],
        ),
        question(
            "science",
            ["science", "space", "history", "technology"],
            vec![
                canned("peer_reviewer", 412, "Fascinating result, though the sample size makes me want a replication first"),
                canned("lab_rat_42", 133, "This is the kind of breakthrough that rewrites a chapter of the textbooks"),
            ],
        ),
        question(
            "fitness",
            ["fitness", "running", "cooking", "sports"],
            vec![
                canned("deadlift_dana", 176, "Hit a new personal record today after months of stalling, consistency really does pay off"),
                canned("rest_day_rick", 52, "Form check: should my knees track over my toes this much at the bottom?"),
            ],
        ),
        question(
            "cooking",
            ["cooking", "coffee", "fitness", "travel"],
            vec![
                canned("cast_iron_carl", 265, "Tried this with brown butter instead and it turned out absolutely incredible"),
                canned("mise_en_place", 94, "The resting step everyone skips is doing most of the work here"),
                canned("salt_fat_acid", 38, "Made a double batch and regret nothing, highly recommend"),
            ],
        ),
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin_pool_is_well_formed() {
        let pool = TopicPool::builtin();

        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let groups = pool.groups(difficulty);
            assert!(groups.len() >= 2, "need enough groups to avoid topic repeats");
            for group in groups {
                assert_eq!(group.topics().len(), OPTIONS_PER_ROUND);
            }
        }
    }

    #[test]
    fn builtin_bank_questions_are_complete() {
        let pool = TopicPool::builtin();

        for q in pool.fallback_bank() {
            assert_eq!(q.options.len(), OPTIONS_PER_ROUND);
            assert!(q.options.contains(&q.correct_topic));
            assert!((2..=3).contains(&q.comments.len()));
            for comment in &q.comments {
                assert!(!comment.text.is_empty());
                assert!(comment.score >= 1);
            }
        }
    }
}
