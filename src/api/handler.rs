use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Json, debug_handler};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::api::server::{AppState, JsonResult, RouteError};
use crate::constants::LEADERBOARD_DEFAULT_LIMIT;
use crate::game::models::{AnswerChoice, PlayerScore, PlayerStats, RankedEntry, StreakRecord};
use crate::game::session::{Advance, AnswerFeedback, RoundView};
use crate::util::clock::today_local;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub session_id: Uuid,
    pub date: String,
    pub streak: u32,
    pub round: RoundView,
}

/// `selected` absent means the client-side timer expired.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub selected: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AdvanceResponse {
    Next { round: RoundView },
    Complete { result: PlayerScore },
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

#[instrument(skip(state))]
pub async fn start_game(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartRequest>,
) -> JsonResult<StartResponse> {
    let date = today_local();
    let challenge = state.cache.daily(&date).await;
    let session = state
        .engine
        .start(&req.user_id, &req.username, &date, challenge)
        .await?;

    let round = session
        .round_view()
        .ok_or(RouteError::Engine(crate::game::engine::EngineError::NotFinished))?;
    let response = StartResponse {
        session_id: session.id,
        date,
        streak: session.streak(),
        round,
    };

    state.sessions.lock().await.insert(session.id, session);
    Ok(Json(response))
}

#[instrument(skip(state))]
pub async fn current_round(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> JsonResult<RoundView> {
    let sessions = state.sessions.lock().await;
    let session = sessions
        .get(&session_id)
        .ok_or(RouteError::UnknownSession(session_id))?;

    session
        .round_view()
        .map(Json)
        .ok_or(RouteError::Session(crate::game::session::SessionError::Complete))
}

#[instrument(skip(state))]
pub async fn submit_answer(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> JsonResult<AnswerFeedback> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or(RouteError::UnknownSession(session_id))?;

    let choice = match req.selected {
        Some(topic) => AnswerChoice::Picked(topic),
        None => AnswerChoice::Timeout,
    };

    Ok(Json(session.answer(choice)?))
}

#[instrument(skip(state))]
pub async fn advance_round(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> JsonResult<AdvanceResponse> {
    let mut sessions = state.sessions.lock().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or(RouteError::UnknownSession(session_id))?;

    match session.advance()? {
        Advance::Next(round) => Ok(Json(AdvanceResponse::Next { round })),
        Advance::Complete => {
            // finished: take the session out of the registry and persist
            let session = sessions
                .remove(&session_id)
                .ok_or(RouteError::UnknownSession(session_id))?;
            drop(sessions);

            let result = state.engine.complete(&session).await?;
            Ok(Json(AdvanceResponse::Complete { result }))
        }
    }
}

#[instrument(skip(state))]
#[debug_handler]
pub async fn daily_leaderboard(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
    Query(query): Query<LeaderboardQuery>,
) -> JsonResult<Vec<RankedEntry>> {
    let limit = query.limit.unwrap_or(LEADERBOARD_DEFAULT_LIMIT);
    let entries = state.engine.leaderboard().top_n(&date, limit).await?;
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn player_streak(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> JsonResult<StreakRecord> {
    Ok(Json(state.engine.streak_of(&user_id).await))
}

#[instrument(skip(state))]
pub async fn player_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> JsonResult<PlayerStats> {
    Ok(Json(state.engine.stats_of(&user_id).await))
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use tokio::sync::Mutex;

    use super::*;
    use crate::content::{ContentError, ContentResult, ContentSource, RawComment, RawPost};
    use crate::db::{GameStore, MemoryStore};
    use crate::game::cache::ChallengeCache;
    use crate::game::challenge::ChallengeGenerator;
    use crate::game::engine::GameEngine;
    use crate::game::topics::TopicPool;
    use async_trait::async_trait;

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

    fn test_state() -> Arc<AppState> {
        let store: Arc<dyn GameStore> = Arc::new(MemoryStore::new());
        let generator = Arc::new(ChallengeGenerator::new(
            Arc::new(DeadSource),
            TopicPool::builtin(),
        ));

        Arc::new(AppState {
            engine: GameEngine::new(Arc::clone(&store)),
            cache: ChallengeCache::new(store, generator),
            sessions: Mutex::new(HashMap::new()),
        })
    }

    fn start_req() -> Json<StartRequest> {
        Json(StartRequest {
            user_id: String::from("t2_a"),
            username: String::from("alice"),
        })
    }

    #[tokio::test]
    async fn a_whole_game_over_the_handlers() {
        let state = test_state();

        let Json(started) = start_game(State(Arc::clone(&state)), start_req())
            .await
            .unwrap();
        assert_eq!(started.round.round_index, 0);

        let mut finished = None;
        for _ in 0..started.round.total_rounds {
            let Json(feedback) = submit_answer(
                State(Arc::clone(&state)),
                Path(started.session_id),
                Json(AnswerRequest { selected: None }),
            )
            .await
            .unwrap();
            assert!(feedback.timed_out);

            let Json(step) = advance_round(State(Arc::clone(&state)), Path(started.session_id))
                .await
                .unwrap();
            if let AdvanceResponse::Complete { result } = step {
                finished = Some(result);
            }
        }

        let result = finished.expect("last advance completes the game");
        assert_eq!(result.total_score, 0);
        assert_eq!(result.correct_count, 0);

        // the session is gone and the day is now gated
        assert!(matches!(
            current_round(State(Arc::clone(&state)), Path(started.session_id)).await,
            Err(RouteError::UnknownSession(_))
        ));
        assert!(matches!(
            start_game(State(state), start_req()).await,
            Err(RouteError::Engine(crate::game::engine::EngineError::AlreadyPlayed))
        ));
    }

    #[tokio::test]
    async fn answering_twice_is_rejected_over_http_too() {
        let state = test_state();
        let Json(started) = start_game(State(Arc::clone(&state)), start_req())
            .await
            .unwrap();

        submit_answer(
            State(Arc::clone(&state)),
            Path(started.session_id),
            Json(AnswerRequest { selected: Some(String::from("gaming")) }),
        )
        .await
        .unwrap();

        let second = submit_answer(
            State(state),
            Path(started.session_id),
            Json(AnswerRequest { selected: None }),
        )
        .await;
        assert!(matches!(
            second,
            Err(RouteError::Session(crate::game::session::SessionError::AlreadyAnswered))
        ));
    }

    #[tokio::test]
    async fn unknown_session_is_a_404_shaped_error() {
        let state = test_state();
        let missing = Uuid::new_v4();
        assert!(matches!(
            current_round(State(state), Path(missing)).await,
            Err(RouteError::UnknownSession(_))
        ));
    }
}
