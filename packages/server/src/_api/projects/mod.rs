pub mod by_project_id;
pub mod memberships;

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::membership::CreateProject;
use crate::state::AppState;

/// POST /api/projects
pub async fn post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<CreateProject>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (project, leader) = state.workflow.create_project(&auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(json!({ "project": project, "leader": leader }))))
}
