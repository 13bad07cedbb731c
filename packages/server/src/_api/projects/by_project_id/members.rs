use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use teamroom_entity::types::ProjectMember;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/projects/{project_id}/members
pub async fn get(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<ProjectMember>>, ApiError> {
    Ok(Json(state.workflow.list_members(&auth.user_id, &project_id).await?))
}

/// DELETE /api/projects/{project_id}/members/{member_id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((project_id, member_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.workflow.remove_member(&auth.user_id, &project_id, &member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
