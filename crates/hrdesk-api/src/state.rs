//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use hrdesk_auth::{AuthManager, PolicyEnforcer};
use hrdesk_core::config::AppConfig;
use hrdesk_database::DatabasePool;
use hrdesk_service::{
    ActivityService, CompanyService, EmployeeService, ProfileService, ReportService, TaskService,
};

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped or pool handles, so cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db: DatabasePool,
    /// Per-client limiter for the unauthenticated auth endpoints
    pub rate_limiter: RateLimiter,

    // ── Auth ─────────────────────────────────────────────────
    /// Sign-in, verification and reset flows
    pub auth: Arc<AuthManager>,
    /// Typed row policy table
    pub policy: Arc<PolicyEnforcer>,

    // ── Services ─────────────────────────────────────────────
    /// Company service
    pub company_service: Arc<CompanyService>,
    /// Employee service
    pub employee_service: Arc<EmployeeService>,
    /// Task and comment service
    pub task_service: Arc<TaskService>,
    /// Report service
    pub report_service: Arc<ReportService>,
    /// Activity log service
    pub activity_service: Arc<ActivityService>,
    /// Own-profile service
    pub profile_service: Arc<ProfileService>,
}

impl AppState {
    /// Wires every service over one pool and auth manager.
    pub fn new(config: AppConfig, db: DatabasePool, auth: Arc<AuthManager>) -> Self {
        let db_pool = db.pool().clone();
        let policy = Arc::new(PolicyEnforcer::new());
        let rate_limiter = RateLimiter::new(
            config.rate_limit.burst,
            config.rate_limit.refill_per_second,
        );

        Self {
            company_service: Arc::new(CompanyService::new(db_pool.clone(), Arc::clone(&policy))),
            employee_service: Arc::new(EmployeeService::new(
                db_pool.clone(),
                Arc::clone(&policy),
                Arc::clone(&auth),
            )),
            task_service: Arc::new(TaskService::new(db_pool.clone(), Arc::clone(&policy))),
            report_service: Arc::new(ReportService::new(db_pool.clone(), Arc::clone(&policy))),
            activity_service: Arc::new(ActivityService::new(db_pool.clone(), Arc::clone(&policy))),
            profile_service: Arc::new(ProfileService::new(db_pool.clone(), Arc::clone(&policy))),
            config: Arc::new(config),
            db,
            rate_limiter,
            auth,
            policy,
        }
    }
}
