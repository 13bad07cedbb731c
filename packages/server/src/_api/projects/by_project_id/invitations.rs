use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use teamroom_entity::types::{MembershipStatus, ProjectMember};

use super::MemberTarget;
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/projects/{project_id}/invitations
pub async fn post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(project_id): Path<String>,
    Json(target): Json<MemberTarget>,
) -> Result<(StatusCode, Json<ProjectMember>), ApiError> {
    let record = state.workflow.invite(&auth.user_id, &project_id, &target.member_id).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /api/projects/{project_id}/invitations/{member_id}/accept
pub async fn accept(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((project_id, member_id)): Path<(String, String)>,
) -> Result<Json<ProjectMember>, ApiError> {
    Ok(Json(state.workflow.accept_invite(&auth.user_id, &project_id, &member_id).await?))
}

/// DELETE /api/projects/{project_id}/invitations/{member_id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((project_id, member_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .workflow
        .reject(&auth.user_id, &project_id, &member_id, MembershipStatus::Invited)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
