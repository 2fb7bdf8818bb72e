use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use crate::constants::{CHALLENGE_TTL, GENERATION_MARKER_TTL};
use crate::db::{GameStore, StoreKey};
use crate::game::challenge::ChallengeGenerator;
use crate::game::models::DailyChallenge;

/// Serves the day's shared challenge.
///
/// A cache hit is returned verbatim so every player sees identical rounds.
/// On a miss the caller immediately gets offline-bank rounds while a
/// background task generates the real challenge and writes it for everyone
/// after them. First players of the day may therefore see bank content; that
/// trade is intentional.
pub struct ChallengeCache {
    store: Arc<dyn GameStore>,
    generator: Arc<ChallengeGenerator>,
}

impl ChallengeCache {
    pub fn new(store: Arc<dyn GameStore>, generator: Arc<ChallengeGenerator>) -> Self {
        Self { store, generator }
    }

    #[instrument(skip(self))]
    pub async fn daily(&self, date: &str) -> DailyChallenge {
        let key = String::from(StoreKey::Challenge(date));

        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<DailyChallenge>(&raw) {
                Ok(challenge) => return challenge,
                Err(e) => {
                    warn!(error = %e, date, "cached challenge is corrupt, regenerating");
                }
            },
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, date, "challenge cache read failed, serving offline bank");
            }
        }

        self.spawn_generation(date);
        self.generator.fallback_challenge(date)
    }

    /// Fire-and-forget generation; a marker key keeps concurrent first-of-day
    /// requests from generating the same challenge twice. Failures are logged
    /// and swallowed: the caller already has playable rounds.
    fn spawn_generation(&self, date: &str) {
        let store = Arc::clone(&self.store);
        let generator = Arc::clone(&self.generator);
        let date = String::from(date);

        tokio::spawn(async move {
            let marker = String::from(StoreKey::ChallengePending(&date));
            match store.set_if_absent(&marker, "1", GENERATION_MARKER_TTL).await {
                Ok(true) => {}
                Ok(false) => {
                    debug!(date, "challenge generation already in flight");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, date, "could not claim generation marker");
                    return;
                }
            }

            let challenge = generator.generate(&date).await;
            let key = String::from(StoreKey::Challenge(&date));
            match serde_json::to_string(&challenge) {
                Ok(raw) => {
                    if let Err(e) = store.set(&key, &raw, Some(CHALLENGE_TTL)).await {
                        error!(error = %e, date, "failed to cache generated challenge");
                    }
                }
                Err(e) => error!(error = %e, date, "failed to serialize generated challenge"),
            }
        });
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::constants::ROUNDS_PER_DAY;
    use crate::content::{ContentError, ContentResult, ContentSource, RawComment, RawPost};
    use crate::db::MemoryStore;
    use crate::game::topics::TopicPool;

    struct DeadSource;

    #[async_trait]
    impl ContentSource for DeadSource {
        async fn top_posts(
            &self,
            topic: &str,
            _window: &str,
            _limit: usize,
        ) -> ContentResult<Vec<RawPost>> {
            Err(ContentError::NoPosts(String::from(topic)))
        }

        async fn top_comments(
            &self,
            _post_id: &str,
            _limit: usize,
        ) -> ContentResult<Vec<RawComment>> {
            Err(ContentError::Fetch(String::from("unreachable")))
        }
    }

    fn cache_over(store: Arc<dyn GameStore>) -> ChallengeCache {
        let generator = Arc::new(ChallengeGenerator::new(
            Arc::new(DeadSource),
            TopicPool::builtin(),
        ));
        ChallengeCache::new(store, generator)
    }

    #[tokio::test]
    async fn hit_returns_stored_challenge_verbatim() {
        let store: Arc<dyn GameStore> = Arc::new(MemoryStore::new());
        let cache = cache_over(Arc::clone(&store));

        let stored = cache.daily("seed").await; // any well-formed value
        let raw = serde_json::to_string(&stored).unwrap();
        store
            .set(&String::from(StoreKey::Challenge("2025-06-15")), &raw, None)
            .await
            .unwrap();

        let served = cache.daily("2025-06-15").await;
        assert_eq!(served.created_at, stored.created_at);
        assert_eq!(
            serde_json::to_string(&served).unwrap(),
            raw,
            "cached rounds must be served unchanged"
        );
    }

    #[tokio::test]
    async fn corrupt_cache_entry_degrades_to_offline_bank() {
        let store: Arc<dyn GameStore> = Arc::new(MemoryStore::new());
        store
            .set(
                &String::from(StoreKey::Challenge("2025-06-15")),
                "{not valid json",
                None,
            )
            .await
            .unwrap();

        let cache = cache_over(Arc::clone(&store));
        let served = cache.daily("2025-06-15").await;
        assert_eq!(served.rounds.len(), ROUNDS_PER_DAY);
    }

    #[tokio::test]
    async fn miss_triggers_background_generation() {
        let store: Arc<dyn GameStore> = Arc::new(MemoryStore::new());
        let cache = cache_over(Arc::clone(&store));

        let immediate = cache.daily("2025-06-15").await;
        assert_eq!(immediate.rounds.len(), ROUNDS_PER_DAY);

        // give the spawned task a few chances to run
        let key = String::from(StoreKey::Challenge("2025-06-15"));
        let mut cached = None;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if let Some(raw) = store.get(&key).await.unwrap() {
                cached = Some(raw);
                break;
            }
        }

        let raw = cached.expect("background generation should populate the cache");
        let challenge: DailyChallenge = serde_json::from_str(&raw).unwrap();
        assert_eq!(challenge.rounds.len(), ROUNDS_PER_DAY);
        assert_eq!(challenge.date, "2025-06-15");
    }
}
