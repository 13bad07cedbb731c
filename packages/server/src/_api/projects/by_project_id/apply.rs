use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use teamroom_entity::types::ProjectMember;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/projects/{project_id}/apply
pub async fn post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(project_id): Path<String>,
) -> Result<(StatusCode, Json<ProjectMember>), ApiError> {
    let record = state.workflow.apply(&auth.user_id, &project_id).await?;
    Ok((StatusCode::CREATED, Json(record)))
}
