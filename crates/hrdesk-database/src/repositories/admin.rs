//! Super-admin profile repository.

use sqlx::PgPool;
use uuid::Uuid;

use hrdesk_core::error::AppError;
use hrdesk_core::result::AppResult;
use hrdesk_entity::role::AdminProfile;
use hrdesk_entity::role::role::ADMIN_TABLE_ROLE;

use crate::{db_err, is_unique_violation};

/// Repository for the `admin` table.
#[derive(Debug, Clone)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    /// Create a new admin repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the admin profile of a user.
    pub async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Option<AdminProfile>> {
        sqlx::query_as::<_, AdminProfile>("SELECT * FROM admin WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to look up admin profile"))
    }

    /// Grant super-admin rights to a user.
    pub async fn create(&self, user_id: Uuid, full_name: Option<&str>) -> AppResult<AdminProfile> {
        sqlx::query_as::<_, AdminProfile>(
            "INSERT INTO admin (user_id, full_name, role) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(full_name)
        .bind(ADMIN_TABLE_ROLE)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "admin_user_id_key") {
                AppError::conflict("User is already a super admin")
            } else {
                db_err("Failed to create admin profile")(e)
            }
        })
    }

    /// List every super admin.
    pub async fn find_all(&self) -> AppResult<Vec<AdminProfile>> {
        sqlx::query_as::<_, AdminProfile>("SELECT * FROM admin ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("Failed to list admins"))
    }
}
