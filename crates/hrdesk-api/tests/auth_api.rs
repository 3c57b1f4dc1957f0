//! End-to-end tests of the auth endpoints and the policy gate, driven
//! through the router with in-memory account and role stores.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use hrdesk_api::{AppState, build_app};
use hrdesk_auth::store::{MemoryAccountStore, MemoryRoleStore};
use hrdesk_auth::AuthManager;
use hrdesk_core::config::{AppConfig, RateLimitConfig};
use hrdesk_database::DatabasePool;
use hrdesk_service::HttpMailer;

const PASSWORD: &str = "violet-Harbor-93-lantern";

struct TestApp {
    router: Router,
    auth: Arc<AuthManager>,
    roles: MemoryRoleStore,
}

fn test_app_with(rate_limit: RateLimitConfig) -> TestApp {
    let mut config = AppConfig::default();
    config.auth.pbkdf2_iterations = 10_000;
    config.database.min_connections = 0;
    config.rate_limit = rate_limit;

    let accounts = MemoryAccountStore::new();
    let roles = MemoryRoleStore::new();
    let mailer = Arc::new(HttpMailer::new(&config.mail).unwrap());
    let auth = Arc::new(AuthManager::new(
        &config.auth,
        Arc::new(accounts),
        Arc::new(roles.clone()),
        mailer,
    ));

    let db = DatabasePool::connect_lazy(&config.database).unwrap();
    let cors = config.server.cors.clone();
    let router = build_app(AppState::new(config, db, Arc::clone(&auth)), &cors);

    TestApp {
        router,
        auth,
        roles,
    }
}

fn test_app() -> TestApp {
    test_app_with(RateLimitConfig {
        enabled: false,
        ..RateLimitConfig::default()
    })
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn sign_in(app: &TestApp, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        request(
            Method::POST,
            "/api/auth/sign-in",
            None,
            Some(json!({ "email": email, "password": password })),
        ),
    )
    .await
}

/// Creates an account and attaches it to a fresh company as an employee.
async fn employee(app: &TestApp, email: &str) -> Uuid {
    let user = app
        .auth
        .create_account(email, PASSWORD, Some("Kari Nordmann"))
        .await
        .unwrap();
    app.roles
        .insert_member(user.id, Uuid::new_v4(), "employee")
        .await;
    user.id
}

async fn token_for(app: &TestApp, email: &str) -> String {
    let (status, body) = sign_in(app, email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, request(Method::GET, "/api/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_sign_up_with_company_then_session() {
    let app = test_app();
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/sign-up",
            None,
            Some(json!({
                "email": "Eier@Fjordbakeri.no",
                "password": PASSWORD,
                "full_name": "Ingrid Fjord",
                "company_name": "Fjord Bakeri AS"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["principal"]["role"], "company_admin");
    assert_eq!(
        body["data"]["user"]["email"].as_str().unwrap().to_lowercase(),
        "eier@fjordbakeri.no"
    );
    assert!(body["data"]["user"].get("password_hash").is_none());

    let token = body["data"]["token"].as_str().unwrap();
    let (status, body) = send(
        &app,
        request(Method::GET, "/api/auth/session", Some(token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["principal"]["role"], "company_admin");
}

#[tokio::test]
async fn test_sign_up_without_company_is_rejected_and_leaves_no_account() {
    let app = test_app();
    let sign_up = |company: Option<&str>| {
        let mut body = json!({
            "email": "solo@firma.no",
            "password": PASSWORD,
            "full_name": "Solveig Solo"
        });
        if let Some(company) = company {
            body["company_name"] = json!(company);
        }
        request(Method::POST, "/api/auth/sign-up", None, Some(body))
    };

    let (status, body) = send(&app, sign_up(None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"], "VALIDATION_ERROR");

    for blank in ["", "   "] {
        let (status, body) = send(&app, sign_up(Some(blank))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    let (status, _) = sign_in(&app, "solo@firma.no", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, sign_up(Some("Solo Regnskap AS"))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["principal"]["role"], "company_admin");
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let app = test_app();
    employee(&app, "per@firma.no").await;

    let (status, wrong_password) = sign_in(&app, "per@firma.no", "not-the-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = sign_in(&app, "ukjent@firma.no", PASSWORD).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(wrong_password, unknown);
    assert_eq!(unknown["error"], "UNAUTHORIZED");
    assert_eq!(unknown["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_account_without_role_cannot_sign_in() {
    let app = test_app();
    app.auth
        .create_account("ingen@rolle.no", PASSWORD, None)
        .await
        .unwrap();

    let (status, body) = sign_in(&app, "ingen@rolle.no", PASSWORD).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_session_reports_role_from_tables() {
    let app = test_app();
    let user_id = employee(&app, "lise@firma.no").await;
    let token = token_for(&app, "lise@firma.no").await;

    app.roles.make_super_admin(user_id).await;

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/auth/session", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["principal"]["role"], "super_admin");
}

#[tokio::test]
async fn test_sign_out_revokes_token() {
    let app = test_app();
    employee(&app, "ola@firma.no").await;
    let token = token_for(&app, "ola@firma.no").await;

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/auth/sign-out", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/auth/session", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has been revoked");
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let app = test_app();
    let (status, body) = send(&app, request(Method::GET, "/api/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing Authorization header");

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/tasks", Some("not.a.jwt"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_reset_request_is_silent_for_unknown_address() {
    let app = test_app();
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/password-reset",
            None,
            Some(json!({ "email": "finnes.ikke@firma.no" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["message"].as_str().unwrap().contains("reset link"));
}

#[tokio::test]
async fn test_bogus_reset_token_is_rejected() {
    let app = test_app();
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/auth/password-reset/confirm",
            None,
            Some(json!({ "token": "forged", "new_password": "copper-Meadow-41-thistle" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Reset link is invalid or has expired");
}

#[tokio::test]
async fn test_request_validation() {
    let app = test_app();
    let (status, body) = sign_in(&app, "", PASSWORD).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_employee_is_denied_before_touching_the_database() {
    let app = test_app();
    employee(&app, "kari@firma.no").await;
    let token = token_for(&app, "kari@firma.no").await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/companies",
            Some(&token),
            Some(json!({ "name": "Egen Bedrift AS" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/api/activity/archive",
            Some(&token),
            Some(json!({ "older_than_days": 30 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_report_kind() {
    let app = test_app();
    employee(&app, "nils@firma.no").await;
    let token = token_for(&app, "nils@firma.no").await;

    let (status, body) = send(
        &app,
        request(Method::GET, "/api/reports/payroll", Some(&token), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("payroll"));
}

#[tokio::test]
async fn test_sign_in_is_rate_limited() {
    let app = test_app_with(RateLimitConfig {
        enabled: true,
        burst: 2,
        refill_per_second: 0.001,
        ..RateLimitConfig::default()
    });

    for _ in 0..2 {
        let (status, _) = sign_in(&app, "noen@firma.no", PASSWORD).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, body) = sign_in(&app, "noen@firma.no", PASSWORD).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "RATE_LIMITED");
}

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_reset_the_limit() {
    let app = test_app_with(RateLimitConfig {
        enabled: true,
        burst: 1,
        refill_per_second: 0.001,
        ..RateLimitConfig::default()
    });

    let attempt = |hop: u8| {
        let mut req = request(
            Method::POST,
            "/api/auth/sign-in",
            None,
            Some(json!({ "email": "noen@firma.no", "password": PASSWORD })),
        );
        req.headers_mut().insert(
            "x-forwarded-for",
            format!("198.51.100.{hop}").parse().unwrap(),
        );
        req
    };

    let (status, _) = send(&app, attempt(1)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    for hop in 2..6 {
        let (status, body) = send(&app, attempt(hop)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "RATE_LIMITED");
    }
}
