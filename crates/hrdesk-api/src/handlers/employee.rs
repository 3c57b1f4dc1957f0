//! Employee handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use hrdesk_core::types::PageResponse;
use hrdesk_entity::role::{CompanyUser, EmployeeView, UpdateCompanyUser};
use hrdesk_service::employee::{CreateEmployeeRequest, CreatedEmployee};

use crate::dto::request::{ChangeRoleRequest, CompanyQuery, SetActiveRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/employees
pub async fn list_employees(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<CompanyQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<EmployeeView>>>> {
    let page = state
        .employee_service
        .list(&auth, query.company_id, pagination.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/employees/{id}
pub async fn get_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<EmployeeView>>> {
    let employee = state.employee_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(employee)))
}

/// POST /api/employees
///
/// Creates the account, attaches it to the company and e-mails an
/// invitation link.
pub async fn create_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateEmployeeRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CreatedEmployee>>)> {
    let created = state.employee_service.create(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}

/// PUT /api/employees/{id}
pub async fn update_employee(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCompanyUser>,
) -> ApiResult<Json<ApiResponse<CompanyUser>>> {
    let employee = state.employee_service.update(&auth, id, req).await?;
    Ok(Json(ApiResponse::ok(employee)))
}

/// PUT /api/employees/{id}/role
pub async fn change_employee_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> ApiResult<Json<ApiResponse<CompanyUser>>> {
    let employee = state
        .employee_service
        .change_role(&auth, id, req.role)
        .await?;
    Ok(Json(ApiResponse::ok(employee)))
}

/// PUT /api/employees/{id}/active
pub async fn set_employee_active(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetActiveRequest>,
) -> ApiResult<Json<ApiResponse<EmployeeView>>> {
    let employee = state
        .employee_service
        .set_active(&auth, id, req.active)
        .await?;
    Ok(Json(ApiResponse::ok(employee)))
}
