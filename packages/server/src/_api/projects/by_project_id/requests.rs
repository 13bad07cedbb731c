use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use teamroom_entity::types::{MembershipStatus, ProjectMember};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/projects/{project_id}/requests
pub async fn get(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<ProjectMember>>, ApiError> {
    Ok(Json(state.workflow.list_pending_requests(&auth.user_id, &project_id).await?))
}

/// POST /api/projects/{project_id}/requests/{member_id}/accept
pub async fn accept(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((project_id, member_id)): Path<(String, String)>,
) -> Result<Json<ProjectMember>, ApiError> {
    Ok(Json(state.workflow.accept_application(&auth.user_id, &project_id, &member_id).await?))
}

/// DELETE /api/projects/{project_id}/requests/{member_id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((project_id, member_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .workflow
        .reject(&auth.user_id, &project_id, &member_id, MembershipStatus::Pending)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
