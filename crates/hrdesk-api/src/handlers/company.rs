//! Company handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use hrdesk_core::types::PageResponse;
use hrdesk_entity::company::Company;

use crate::dto::request::{CreateCompanyRequest, SetActiveRequest, UpdateCompanyRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/companies
pub async fn list_companies(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Company>>>> {
    let page = state
        .company_service
        .list(&auth, pagination.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/companies/{id}
pub async fn get_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Company>>> {
    let company = state.company_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(company)))
}

/// POST /api/companies
pub async fn create_company(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateCompanyRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Company>>)> {
    let company = state.company_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(company))))
}

/// PUT /api/companies/{id}
pub async fn update_company(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateCompanyRequest>,
) -> ApiResult<Json<ApiResponse<Company>>> {
    let company = state.company_service.update(&auth, id, req.into()).await?;
    Ok(Json(ApiResponse::ok(company)))
}

/// PUT /api/companies/{id}/active
pub async fn set_company_active(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetActiveRequest>,
) -> ApiResult<Json<ApiResponse<Company>>> {
    let company = state
        .company_service
        .set_active(&auth, id, req.active)
        .await?;
    Ok(Json(ApiResponse::ok(company)))
}
