//! Company membership repository.

use sqlx::PgConnection;
use uuid::Uuid;

use hrdesk_core::error::AppError;
use hrdesk_core::result::AppResult;
use hrdesk_core::types::pagination::{PageRequest, PageResponse};
use hrdesk_entity::role::{CompanyUser, CreateCompanyUser, EmployeeView, UpdateCompanyUser};

use crate::{db_err, is_unique_violation};

const VIEW_SELECT: &str = "SELECT cu.id, cu.user_id, cu.company_id, cu.full_name, cu.job_title, \
                                  cu.phone, cu.role, u.email, u.status, cu.created_at \
                           FROM company_user cu JOIN users u ON u.id = cu.user_id";

/// Queries over the `company_user` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyUserRepository;

impl CompanyUserRepository {
    /// Find the membership row of a user.
    pub async fn find_by_user_id(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> AppResult<Option<CompanyUser>> {
        sqlx::query_as::<_, CompanyUser>("SELECT * FROM company_user WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(conn)
            .await
            .map_err(db_err("Failed to look up company membership"))
    }

    /// Find a membership row by its ID.
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<CompanyUser>> {
        sqlx::query_as::<_, CompanyUser>("SELECT * FROM company_user WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(db_err("Failed to find employee"))
    }

    /// Find an employee joined with the account row.
    pub async fn find_view(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<EmployeeView>> {
        sqlx::query_as::<_, EmployeeView>(&format!("{VIEW_SELECT} WHERE cu.id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(db_err("Failed to find employee"))
    }

    /// List the employees of a company.
    pub async fn find_by_company(
        conn: &mut PgConnection,
        company_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<EmployeeView>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM company_user WHERE company_id = $1")
                .bind(company_id)
                .fetch_one(&mut *conn)
                .await
                .map_err(db_err("Failed to count employees"))?;

        let employees = sqlx::query_as::<_, EmployeeView>(&format!(
            "{VIEW_SELECT} WHERE cu.company_id = $1 ORDER BY cu.full_name ASC LIMIT $2 OFFSET $3"
        ))
        .bind(company_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list employees"))?;

        Ok(PageResponse::new(
            employees,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Attach a user to a company.
    pub async fn create(
        conn: &mut PgConnection,
        data: &CreateCompanyUser,
    ) -> AppResult<CompanyUser> {
        let role = data.role.company_row_value().ok_or_else(|| {
            AppError::validation(format!("Role '{}' cannot be held in a company", data.role))
        })?;

        sqlx::query_as::<_, CompanyUser>(
            "INSERT INTO company_user (user_id, company_id, full_name, job_title, phone, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.user_id)
        .bind(data.company_id)
        .bind(data.full_name.trim())
        .bind(&data.job_title)
        .bind(&data.phone)
        .bind(role)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "company_user_user_id_key") {
                AppError::conflict("User already belongs to a company")
            } else {
                db_err("Failed to create employee")(e)
            }
        })
    }

    /// Apply a partial profile update.
    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        data: &UpdateCompanyUser,
    ) -> AppResult<CompanyUser> {
        sqlx::query_as::<_, CompanyUser>(
            "UPDATE company_user SET full_name = COALESCE($2, full_name), \
                                     job_title = COALESCE($3, job_title), \
                                     phone = COALESCE($4, phone), \
                                     updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.full_name)
        .bind(&data.job_title)
        .bind(&data.phone)
        .fetch_optional(conn)
        .await
        .map_err(db_err("Failed to update employee"))?
        .ok_or_else(|| AppError::not_found(format!("Employee {id} not found")))
    }

    /// Change the stored role string (`admin` or `employee`).
    pub async fn update_role(
        conn: &mut PgConnection,
        id: Uuid,
        role: &str,
    ) -> AppResult<CompanyUser> {
        sqlx::query_as::<_, CompanyUser>(
            "UPDATE company_user SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(conn)
        .await
        .map_err(db_err("Failed to change employee role"))?
        .ok_or_else(|| AppError::not_found(format!("Employee {id} not found")))
    }
}
