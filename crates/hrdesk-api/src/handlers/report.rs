//! Report handlers for the accident, illness and departure tables.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use hrdesk_core::error::AppError;
use hrdesk_core::types::PageResponse;
use hrdesk_entity::report::{Report, ReportKind};
use hrdesk_service::report::SubmitReportRequest;

use crate::dto::request::{ChangeReportStatusRequest, CompanyQuery};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/reports/{kind}
pub async fn list_reports(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(kind): Path<String>,
    Query(query): Query<CompanyQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Report>>>> {
    let kind: ReportKind = kind.parse()?;
    let page = state
        .report_service
        .list(&auth, kind, query.company_id, pagination.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/reports/{kind}/{id}
pub async fn get_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((kind, id)): Path<(String, Uuid)>,
) -> ApiResult<Json<ApiResponse<Report>>> {
    let kind: ReportKind = kind.parse()?;
    let report = state.report_service.get(&auth, kind, id).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// POST /api/reports/{kind}
pub async fn submit_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(kind): Path<String>,
    Json(req): Json<SubmitReportRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Report>>)> {
    let kind: ReportKind = kind.parse()?;
    if req.details.kind() != kind {
        return Err(AppError::validation(format!(
            "Body describes a {} report but was posted to /reports/{kind}",
            req.details.kind()
        ))
        .into());
    }

    let report = state.report_service.submit(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(report))))
}

/// PUT /api/reports/{kind}/{id}/status
pub async fn change_report_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((kind, id)): Path<(String, Uuid)>,
    Json(req): Json<ChangeReportStatusRequest>,
) -> ApiResult<Json<ApiResponse<Report>>> {
    let kind: ReportKind = kind.parse()?;
    let report = state
        .report_service
        .change_status(&auth, kind, id, req.status)
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}
