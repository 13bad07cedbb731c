use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use teamroom_entity::types::{NewMessage, ProjectMessage};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub message_text: String,
}

/// GET /api/projects/{project_id}/messages
pub async fn get(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<ProjectMessage>>, ApiError> {
    Ok(Json(state.router.history(&project_id, &auth.user_id).await?))
}

/// POST /api/projects/{project_id}/messages, same path as a real-time send
pub async fn post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(project_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<NewMessage>), ApiError> {
    let message = state.router.send(&project_id, &auth.user_id, &request.message_text).await?;
    Ok((StatusCode::CREATED, Json(message)))
}
