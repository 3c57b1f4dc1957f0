//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use hrdesk_auth::{SignedIn, VerifiedSession};
use hrdesk_entity::Principal;
use hrdesk_entity::user::{User, UserStatus};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Generic message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Wraps a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Count response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Count value.
    pub count: u64,
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status string.
    pub status: String,
    /// Server version.
    pub version: String,
}

/// Readiness response including the database probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// `connected` or `unavailable`.
    pub database: String,
}

/// User summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID.
    pub id: Uuid,
    /// E-mail.
    pub email: String,
    /// Full name.
    pub full_name: Option<String>,
    /// Account status.
    pub status: UserStatus,
    /// Last sign-in.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            status: user.status,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

/// Issued session token with the resolved caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Bearer token.
    pub token: String,
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
    /// The signed-in user.
    pub user: UserResponse,
    /// Resolved role.
    pub principal: Principal,
}

impl From<SignedIn> for SessionResponse {
    fn from(signed_in: SignedIn) -> Self {
        Self {
            token: signed_in.token,
            expires_at: signed_in.expires_at,
            user: signed_in.user.into(),
            principal: signed_in.principal,
        }
    }
}

/// The current session as seen by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfoResponse {
    /// Token expiry.
    pub expires_at: DateTime<Utc>,
    /// The signed-in user.
    pub user: UserResponse,
    /// Role resolved from the tables now.
    pub principal: Principal,
}

impl From<VerifiedSession> for SessionInfoResponse {
    fn from(session: VerifiedSession) -> Self {
        Self {
            expires_at: session.claims.expires_at(),
            user: session.user.into(),
            principal: session.principal,
        }
    }
}
