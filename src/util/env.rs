use std::sync::LazyLock;

use tracing::info;

use crate::constants::{DEFAULT_USER_AGENT, SERVER_PORT};

pub static ENV: LazyLock<Env> = LazyLock::new(Env::init);

/// Process configuration, read once from the environment (and `.env` if
/// present). Every variable has a workable default so a bare checkout runs.
#[derive(Debug, Clone)]
pub struct Env {
    pub redis_url: String,
    pub server_port: u16,
    pub user_agent: String,
}

impl Env {
    fn init() -> Self {
        // best-effort; a missing .env file just means plain process env
        let _ = dotenvy::dotenv();

        let env = Self {
            redis_url: dotenvy::var("REDIS_URL")
                .unwrap_or_else(|_| String::from("redis://127.0.0.1:6379")),
            server_port: dotenvy::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(SERVER_PORT),
            user_agent: dotenvy::var("CONTENT_USER_AGENT")
                .unwrap_or_else(|_| String::from(DEFAULT_USER_AGENT)),
        };

        info!(port = env.server_port, "environment loaded");
        env
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        let env = Env::init();
        assert!(env.redis_url.starts_with("redis://"));
        assert!(!env.user_agent.is_empty());
    }
}
