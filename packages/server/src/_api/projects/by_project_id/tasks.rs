use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use teamroom_entity::types::ProjectTask;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::project_tasks::{CreateTask, UpdateTask};
use crate::state::AppState;

/// GET /api/projects/{project_id}/tasks
pub async fn get(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<ProjectTask>>, ApiError> {
    Ok(Json(state.tasks.list_tasks(&auth.user_id, &project_id).await?))
}

/// POST /api/projects/{project_id}/tasks
pub async fn post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(project_id): Path<String>,
    Json(request): Json<CreateTask>,
) -> Result<(StatusCode, Json<ProjectTask>), ApiError> {
    let task = state.tasks.create_task(&auth.user_id, &project_id, request).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PATCH /api/projects/{project_id}/tasks/{task_id}
pub async fn patch(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((project_id, task_id)): Path<(String, String)>,
    Json(request): Json<UpdateTask>,
) -> Result<Json<ProjectTask>, ApiError> {
    Ok(Json(state.tasks.update_task(&auth.user_id, &project_id, &task_id, request).await?))
}

/// DELETE /api/projects/{project_id}/tasks/{task_id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path((project_id, task_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.tasks.delete_task(&auth.user_id, &project_id, &task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
