//! User (credential table) repository.
//!
//! Runs as the table owner: sign-in, token verification and password reset
//! happen before a caller identity exists.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use hrdesk_core::error::AppError;
use hrdesk_core::result::AppResult;
use hrdesk_core::types::pagination::{PageRequest, PageResponse};
use hrdesk_entity::user::{CreateUser, User, UserStatus};

use crate::{db_err, is_unique_violation};

/// Unique index on `LOWER(email)`.
const EMAIL_UNIQUE_INDEX: &str = "users_email_lower_key";

/// Repository for user CRUD and credential operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find user by id"))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find user by email"))
    }

    /// Find the user holding an unexpired reset token digest.
    pub async fn find_by_reset_token(&self, digest: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE reset_token = $1 AND reset_token_expires_at > NOW()",
        )
        .bind(digest)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to find user by reset token"))
    }

    /// List all users with pagination.
    pub async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("Failed to count users"))?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list users"))?;

        Ok(PageResponse::new(
            users,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Create a new active user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, full_name) \
             VALUES ($1, $2, $3) \
             RETURNING *",
        )
        .bind(data.email.trim())
        .bind(&data.password_hash)
        .bind(&data.full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, EMAIL_UNIQUE_INDEX) {
                AppError::conflict("Email already in use")
            } else {
                db_err("Failed to create user")(e)
            }
        })
    }

    /// Update the display name.
    pub async fn update_full_name(&self, user_id: Uuid, full_name: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET full_name = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(full_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update user"))?
        .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Replace the password hash. Any outstanding reset token is invalidated.
    pub async fn update_password(&self, user_id: Uuid, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, reset_token = NULL, \
                              reset_token_expires_at = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to update password"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        Ok(())
    }

    /// Update a user's status.
    pub async fn update_status(&self, user_id: Uuid, status: UserStatus) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update status"))?
        .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    /// Increment failed login attempts and return the new count.
    pub async fn increment_failed_attempts(&self, user_id: Uuid) -> AppResult<i32> {
        let row: (i32,) = sqlx::query_as(
            "UPDATE users SET failed_login_attempts = failed_login_attempts + 1, \
                              updated_at = NOW() \
             WHERE id = $1 RETURNING failed_login_attempts",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to increment failed attempts"))?;

        Ok(row.0)
    }

    /// Refuse sign-in until the given time and reset the failure count.
    pub async fn lock_until(&self, user_id: Uuid, until: DateTime<Utc>) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET locked_until = $2, failed_login_attempts = 0, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(until)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to lock user"))?;
        Ok(())
    }

    /// Record a successful sign-in and clear the failure counters.
    pub async fn record_login(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET last_login_at = NOW(), failed_login_attempts = 0, \
                              locked_until = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to record login"))?;
        Ok(())
    }

    /// Store the digest of a newly issued reset token, replacing any older one.
    pub async fn store_reset_token(
        &self,
        user_id: Uuid,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET reset_token = $2, reset_token_expires_at = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(digest)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to store reset token"))?;
        Ok(())
    }

    /// Consume a reset token and set the new password in one conditional
    /// update. Returns the user ID, or `None` when the token is unknown,
    /// expired or already used.
    pub async fn consume_reset_token(
        &self,
        digest: &str,
        password_hash: &str,
    ) -> AppResult<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "UPDATE users SET password_hash = $2, reset_token = NULL, \
                              reset_token_expires_at = NULL, failed_login_attempts = 0, \
                              locked_until = NULL, updated_at = NOW() \
             WHERE reset_token = $1 AND reset_token_expires_at > NOW() \
             RETURNING id",
        )
        .bind(digest)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to consume reset token"))
    }

    /// Delete a user by ID.
    pub async fn delete(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete user"))?;

        Ok(result.rows_affected() > 0)
    }
}
