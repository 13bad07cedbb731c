use axum::{Json, extract::State};
use teamroom_entity::types::MembershipOverview;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/projects/memberships
pub async fn get(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<MembershipOverview>, ApiError> {
    Ok(Json(state.workflow.list_memberships(&auth.user_id).await?))
}
