//! Own-profile handlers.

use axum::Json;
use axum::extract::State;

use hrdesk_service::profile::{Profile, UpdateProfileRequest};

use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<Profile>>> {
    let profile = state.profile_service.get(&auth).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

/// PUT /api/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ApiResponse<Profile>>> {
    let profile = state.profile_service.update(&auth, req).await?;
    Ok(Json(ApiResponse::ok(profile)))
}
