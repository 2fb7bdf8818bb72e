use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::MatchedPath;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::handler::*;
use crate::db::StoreError;
use crate::game::cache::ChallengeCache;
use crate::game::engine::{EngineError, GameEngine};
use crate::game::session::{GameSession, SessionError};

pub type JsonResult<T> = core::result::Result<Json<T>, RouteError>;

pub struct AppState {
    pub engine: GameEngine,
    pub cache: ChallengeCache,
    pub sessions: Mutex<HashMap<Uuid, GameSession>>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { Response::new(Body::empty()) }))
        //
        // game flow
        .route("/game/start", post(start_game))
        .route("/game/{session}", get(current_round))
        .route("/game/{session}/answer", post(submit_answer))
        .route("/game/{session}/next", post(advance_round))
        //
        // read-only views
        .route("/leaderboard/{date}", get(daily_leaderboard))
        .route("/player/{id}/streak", get(player_streak))
        .route("/player/{id}/stats", get(player_stats))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let method = req.method();
                let uri = req.uri();

                let matched_path = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|matched| matched.as_str());

                tracing::debug_span!("api_request", ?method, ?uri, ?matched_path)
            }),
        )
        .with_state(state)
}

#[instrument(skip(state))]
pub async fn start_server(state: Arc<AppState>, port: u16) -> Result<(), RouteError> {
    let app = router(state);

    let socket_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    let listener = tokio::net::TcpListener::bind(socket_addr).await?;
    info!(server_url = %format!("http://127.0.0.1:{}", port), "server ready");

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("unknown session '{0}'")]
    UnknownSession(Uuid),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            message: String,
        }

        let (status, message) = match &self {
            RouteError::Engine(EngineError::AlreadyPlayed) => (
                StatusCode::CONFLICT,
                String::from("you already played today's challenge, come back tomorrow"),
            ),

            RouteError::Engine(EngineError::NotFinished) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            RouteError::Session(err) => (StatusCode::BAD_REQUEST, err.to_string()),

            RouteError::UnknownSession(id) => {
                (StatusCode::NOT_FOUND, format!("unknown session '{id}'"))
            }

            RouteError::Store(err) => {
                tracing::error!(error = ?err, "store failure inside route handler");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }

            RouteError::Io(err) => {
                tracing::error!(error = ?err, "io failure inside route handler");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}
