//! Task and comment handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use hrdesk_core::types::PageResponse;
use hrdesk_entity::task::{Task, TaskComment, UpdateTask};
use hrdesk_service::task::CreateTaskRequest;

use crate::dto::request::{AddCommentRequest, ChangeTaskStatusRequest, TaskListQuery};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TaskListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Task>>>> {
    let page = state
        .task_service
        .list(
            &auth,
            query.company_id,
            query.filter(),
            pagination.into_page_request(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    let task = state.task_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Task>>)> {
    let task = state.task_service.create(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(task))))
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTask>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    let task = state.task_service.update(&auth, id, req).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// PUT /api/tasks/{id}/status
pub async fn change_task_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeTaskStatusRequest>,
) -> ApiResult<Json<ApiResponse<Task>>> {
    let task = state
        .task_service
        .change_status(&auth, id, req.status)
        .await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.task_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Task deleted"))))
}

/// GET /api/tasks/{id}/comments
pub async fn list_comments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<TaskComment>>>> {
    let comments = state.task_service.list_comments(&auth, id).await?;
    Ok(Json(ApiResponse::ok(comments)))
}

/// POST /api/tasks/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TaskComment>>)> {
    let comment = state.task_service.add_comment(&auth, id, &req.body).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(comment))))
}

/// DELETE /api/comments/{id}
pub async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.task_service.delete_comment(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Comment deleted"))))
}
