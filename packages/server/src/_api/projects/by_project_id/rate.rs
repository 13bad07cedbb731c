use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::membership::ProjectRating;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RateRequest {
    pub rating: i64,
}

/// POST /api/projects/{project_id}/rate
pub async fn post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(project_id): Path<String>,
    Json(request): Json<RateRequest>,
) -> Result<Json<ProjectRating>, ApiError> {
    Ok(Json(state.workflow.rate(&auth.user_id, &project_id, request.rating).await?))
}
