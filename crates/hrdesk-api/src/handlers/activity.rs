//! Activity log handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use hrdesk_core::types::PageResponse;
use hrdesk_entity::activity::{ActivityLog, ArchivedActivityLog};
use hrdesk_service::activity::service::RecordActivityRequest;

use crate::dto::request::{ActivityQuery, ArchiveActivityRequest};
use crate::dto::response::{ApiResponse, CountResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/activity
pub async fn list_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ActivityQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ActivityLog>>>> {
    let page = state
        .activity_service
        .list(
            &auth,
            query.company_id,
            query.user_id,
            pagination.into_page_request(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/activity
pub async fn record_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<RecordActivityRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ActivityLog>>)> {
    let entry = state.activity_service.record(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(entry))))
}

/// GET /api/activity/archive
pub async fn list_archived_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<ArchivedActivityLog>>>> {
    let page = state
        .activity_service
        .list_archived(&auth, pagination.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// POST /api/activity/archive
pub async fn archive_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ArchiveActivityRequest>,
) -> ApiResult<Json<ApiResponse<CountResponse>>> {
    let count = state
        .activity_service
        .archive_older_than(&auth, req.older_than_days)
        .await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}
