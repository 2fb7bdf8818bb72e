use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api::server::{AppState, RouteError, start_server};
use crate::content::reddit::RedditClient;
use crate::db::{GameStore, MemoryStore, RedisStore};
use crate::game::cache::ChallengeCache;
use crate::game::challenge::ChallengeGenerator;
use crate::game::engine::GameEngine;
use crate::game::topics::TopicPool;

mod api;
mod constants;
mod content;
mod db;
mod game;
mod util;

#[derive(Debug, Error)]
enum RunnerErr {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Route(#[from] RouteError),
}

type Result<T> = core::result::Result<T, RunnerErr>;

#[tokio::main]
async fn main() -> Result<()> {
    util::telemetry::init();
    let env = &*util::env::ENV;

    info!("starting daily challenge server");

    let store: Arc<dyn GameStore> = match RedisStore::connect(&env.redis_url).await {
        Ok(redis) => Arc::new(redis),
        Err(e) => {
            warn!(
                error = %e,
                "redis unavailable, running on the in-memory store (state will not survive restarts)"
            );
            Arc::new(MemoryStore::new())
        }
    };

    let source = Arc::new(RedditClient::new(&env.user_agent));
    let generator = Arc::new(ChallengeGenerator::new(source, TopicPool::builtin()));

    let state = Arc::new(AppState {
        engine: GameEngine::new(Arc::clone(&store)),
        cache: ChallengeCache::new(store, generator),
        sessions: Mutex::new(HashMap::new()),
    });

    start_server(state, env.server_port).await?;
    Ok(())
}
