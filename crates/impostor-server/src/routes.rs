//! Game routes.

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use impostor_core::SessionId;
use impostor_runtime::GameSnapshot;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::errors::ApiError;
use crate::server::AppState;

/// `POST /create_game` body. Both fields fall back to configured defaults.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CreateGameRequest {
    /// Model for crewmate seats.
    #[serde(default)]
    pub crewmate_model: Option<String>,
    /// Model for impostor seats.
    #[serde(default)]
    pub impostor_model: Option<String>,
}

/// `POST /create_game` response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateGameResponse {
    /// New session id.
    pub game_id: SessionId,
    /// Always `"running"`.
    pub status: String,
}

/// `GET /game_state` query.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct GameStateQuery {
    /// Session to project.
    pub game_id: SessionId,
}

/// `POST /human_action` body.
#[derive(Clone, Debug, Deserialize)]
pub struct HumanActionRequest {
    /// Session the move is for.
    pub game_id: SessionId,
    /// Index into the offered actions.
    pub action_index: usize,
    /// Speech for moves that take a message.
    #[serde(default)]
    pub speech_text: Option<String>,
}

/// `POST /human_action` response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AcceptedResponse {
    /// Always `"accepted"`.
    pub status: String,
}

/// POST /create_game
///
/// Blocks until the new game has a human seat (or fails to get one).
#[instrument(skip_all)]
pub async fn create_game(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateGameResponse>, ApiError> {
    let request: CreateGameRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateGameRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?
    };

    let config = state.game.game_config(
        request.crewmate_model.as_deref(),
        request.impostor_model.as_deref(),
    );
    let game_id = state.manager.create(config).await?;
    info!(%game_id, "game created over http");
    Ok(Json(CreateGameResponse {
        game_id,
        status: "running".into(),
    }))
}

/// GET /game_state?game_id=
pub async fn game_state(
    State(state): State<AppState>,
    query: Result<Query<GameStateQuery>, QueryRejection>,
) -> Result<Json<GameSnapshot>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    Ok(Json(state.manager.get_state(query.game_id)?))
}

/// POST /human_action
pub async fn human_action(
    State(state): State<AppState>,
    body: Result<Json<HumanActionRequest>, JsonRejection>,
) -> Result<Json<AcceptedResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    state.manager.submit_action(
        request.game_id,
        request.action_index,
        request.speech_text.unwrap_or_default(),
    )?;
    Ok(Json(AcceptedResponse {
        status: "accepted".into(),
    }))
}
