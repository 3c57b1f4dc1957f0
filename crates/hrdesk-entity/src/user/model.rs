//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::UserStatus;

/// A row of the `users` credential table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Sign-in e-mail address (unique, case-insensitive).
    pub email: String,
    /// Stored password hash (`iterations:salt:hash`).
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Human-readable name.
    pub full_name: Option<String>,
    /// Account status.
    pub status: UserStatus,
    /// Number of consecutive failed sign-in attempts.
    #[serde(default)]
    pub failed_login_attempts: i32,
    /// Sign-in is refused until this time.
    pub locked_until: Option<DateTime<Utc>>,
    /// SHA-256 digest of the outstanding reset token.
    #[serde(skip_serializing, default)]
    pub reset_token: Option<String>,
    /// When the outstanding reset token stops being valid.
    #[serde(skip_serializing, default)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    /// Last successful sign-in.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether a temporary lockout is in force at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        if self.status == UserStatus::Locked {
            return true;
        }
        matches!(self.locked_until, Some(until) if now < until)
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// E-mail address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Full name (optional).
    pub full_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(status: UserStatus, locked_until: Option<DateTime<Utc>>) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "a@b.io".to_string(),
            password_hash: "x".to_string(),
            full_name: None,
            status,
            failed_login_attempts: 0,
            locked_until,
            reset_token: None,
            reset_token_expires_at: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_lockout_window() {
        let now = Utc::now();
        assert!(user(UserStatus::Active, Some(now + Duration::minutes(5))).is_locked_at(now));
        assert!(!user(UserStatus::Active, Some(now - Duration::minutes(5))).is_locked_at(now));
        assert!(user(UserStatus::Locked, None).is_locked_at(now));
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut u = user(UserStatus::Active, None);
        u.reset_token = Some("digest".to_string());
        let json = serde_json::to_value(&u).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("reset_token").is_none());

        let back: User = serde_json::from_value(json).unwrap();
        assert_eq!(back.email, u.email);
        assert!(back.password_hash.is_empty());
    }
}
