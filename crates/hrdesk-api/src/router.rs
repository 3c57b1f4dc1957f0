//! Route definitions for the HRDesk HTTP API.
//!
//! All routes are organized by resource and mounted under `/api`.

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the `/api` router with every route and the request logger.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(public_auth_routes(state.clone()))
        .merge(session_routes())
        .merge(profile_routes())
        .merge(company_routes())
        .merge(employee_routes())
        .merge(task_routes())
        .merge(report_routes())
        .merge(activity_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Unauthenticated auth endpoints, behind the per-client rate limiter.
fn public_auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/sign-in", post(handlers::auth::sign_in))
        .route("/auth/sign-up", post(handlers::auth::sign_up))
        .route(
            "/auth/password-reset",
            post(handlers::auth::request_password_reset),
        )
        .route(
            "/auth/password-reset/confirm",
            post(handlers::auth::confirm_password_reset),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::rate_limit::limit_auth_requests,
        ))
}

/// Endpoints that act on the caller's token.
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-out", post(handlers::auth::sign_out))
        .route("/auth/session", get(handlers::auth::session))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/password", put(handlers::auth::change_password))
}

fn profile_routes() -> Router<AppState> {
    Router::new().route(
        "/me",
        get(handlers::profile::get_profile).put(handlers::profile::update_profile),
    )
}

fn company_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies",
            get(handlers::company::list_companies).post(handlers::company::create_company),
        )
        .route(
            "/companies/{id}",
            get(handlers::company::get_company).put(handlers::company::update_company),
        )
        .route(
            "/companies/{id}/active",
            put(handlers::company::set_company_active),
        )
}

fn employee_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/employees",
            get(handlers::employee::list_employees).post(handlers::employee::create_employee),
        )
        .route(
            "/employees/{id}",
            get(handlers::employee::get_employee).put(handlers::employee::update_employee),
        )
        .route(
            "/employees/{id}/role",
            put(handlers::employee::change_employee_role),
        )
        .route(
            "/employees/{id}/active",
            put(handlers::employee::set_employee_active),
        )
}

/// Tasks and their comments
fn task_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tasks",
            get(handlers::task::list_tasks).post(handlers::task::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::task::get_task)
                .put(handlers::task::update_task)
                .delete(handlers::task::delete_task),
        )
        .route("/tasks/{id}/status", put(handlers::task::change_task_status))
        .route(
            "/tasks/{id}/comments",
            get(handlers::task::list_comments).post(handlers::task::add_comment),
        )
        .route("/comments/{id}", delete(handlers::task::delete_comment))
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reports/{kind}",
            get(handlers::report::list_reports).post(handlers::report::submit_report),
        )
        .route("/reports/{kind}/{id}", get(handlers::report::get_report))
        .route(
            "/reports/{kind}/{id}/status",
            put(handlers::report::change_report_status),
        )
}

fn activity_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/activity",
            get(handlers::activity::list_activity).post(handlers::activity::record_activity),
        )
        .route(
            "/activity/archive",
            get(handlers::activity::list_archived_activity)
                .post(handlers::activity::archive_activity),
        )
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/ready", get(handlers::health::readiness))
}
