use axum::{Json, extract::State};
use serde::Deserialize;
use teamroom_entity::types::UserProfile;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ProfileRequest {
    pub full_name: String,
}

/// PUT /api/profile
pub async fn put(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let full_name = request.full_name.trim();
    if full_name.is_empty() {
        return Err(ApiError::bad_request("full_name must not be empty"));
    }

    let profile = state.profiles.upsert(UserProfile::new(&auth.user_id, full_name)).await?;
    Ok(Json(profile))
}
