use axum::{
    Json,
    extract::{Path, State},
};
use teamroom_entity::types::ProjectMember;

use super::MemberTarget;
use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/projects/{project_id}/mentors
pub async fn post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(project_id): Path<String>,
    Json(target): Json<MemberTarget>,
) -> Result<Json<ProjectMember>, ApiError> {
    Ok(Json(state.workflow.promote_mentor(&auth.user_id, &project_id, &target.member_id).await?))
}
