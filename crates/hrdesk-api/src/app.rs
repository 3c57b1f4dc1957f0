//! Application builder: wires router, middleware and state into an Axum
//! app and runs it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use hrdesk_auth::AuthManager;
use hrdesk_auth::store::{PgAccountStore, PgRoleStore};
use hrdesk_core::config::{AppConfig, CorsConfig};
use hrdesk_core::error::AppError;
use hrdesk_database::{DatabasePool, migration};
use hrdesk_service::HttpMailer;

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState, cors_config: &CorsConfig) -> Router {
    build_router(state)
        .layer(build_cors_layer(cors_config))
        .layer(TraceLayer::new_for_http())
}

/// Runs the HRDesk server until Ctrl+C.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting HRDesk server...");

    // ── Step 1: Database ─────────────────────────────────────────
    let db = DatabasePool::connect(&config.database).await?;
    if config.database.run_migrations {
        migration::run_migrations(db.pool()).await?;
    }
    let db_pool = db.pool().clone();

    // ── Step 2: Outbound mail ────────────────────────────────────
    let mailer = Arc::new(HttpMailer::new(&config.mail)?);
    if !mailer.is_enabled() {
        info!("Mail delivery is disabled; reset and invitation e-mails will be logged only");
    }

    // ── Step 3: Auth ─────────────────────────────────────────────
    let auth = Arc::new(AuthManager::new(
        &config.auth,
        Arc::new(PgAccountStore::new(db_pool.clone())),
        Arc::new(PgRoleStore::new(db_pool.clone())),
        mailer,
    ));

    // ── Step 4: HTTP server ──────────────────────────────────────
    let addr = config.server.bind_address();
    let cors = config.server.cors.clone();
    let app = build_app(AppState::new(config, db.clone(), auth), &cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(address = %addr, "HRDesk server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db.close().await;
    info!("HRDesk server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
