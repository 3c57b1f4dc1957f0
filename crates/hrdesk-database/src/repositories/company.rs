//! Company repository.

use sqlx::PgConnection;
use uuid::Uuid;

use hrdesk_core::error::AppError;
use hrdesk_core::result::AppResult;
use hrdesk_core::types::pagination::{PageRequest, PageResponse};
use hrdesk_entity::company::{Company, CreateCompany, UpdateCompany};

use crate::db_err;

/// Queries over the `company` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyRepository;

impl CompanyRepository {
    /// List visible companies.
    pub async fn find_all(
        conn: &mut PgConnection,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Company>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM company")
            .fetch_one(&mut *conn)
            .await
            .map_err(db_err("Failed to count companies"))?;

        let companies = sqlx::query_as::<_, Company>(
            "SELECT * FROM company ORDER BY name ASC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list companies"))?;

        Ok(PageResponse::new(
            companies,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Find a company by ID.
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> AppResult<Option<Company>> {
        sqlx::query_as::<_, Company>("SELECT * FROM company WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(db_err("Failed to find company"))
    }

    /// Create a company.
    pub async fn create(conn: &mut PgConnection, data: &CreateCompany) -> AppResult<Company> {
        sqlx::query_as::<_, Company>(
            "INSERT INTO company (name, org_number, address, contact_email) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.name.trim())
        .bind(&data.org_number)
        .bind(&data.address)
        .bind(&data.contact_email)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            if crate::is_unique_violation(&e, "company_org_number_key") {
                AppError::conflict("A company with this organisation number already exists")
            } else {
                db_err("Failed to create company")(e)
            }
        })
    }

    /// Apply a partial update.
    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        data: &UpdateCompany,
    ) -> AppResult<Company> {
        sqlx::query_as::<_, Company>(
            "UPDATE company SET name = COALESCE($2, name), \
                                org_number = COALESCE($3, org_number), \
                                address = COALESCE($4, address), \
                                contact_email = COALESCE($5, contact_email), \
                                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.org_number)
        .bind(&data.address)
        .bind(&data.contact_email)
        .fetch_optional(conn)
        .await
        .map_err(db_err("Failed to update company"))?
        .ok_or_else(|| AppError::not_found(format!("Company {id} not found")))
    }

    /// Activate or deactivate a company.
    pub async fn set_active(conn: &mut PgConnection, id: Uuid, active: bool) -> AppResult<Company> {
        sqlx::query_as::<_, Company>(
            "UPDATE company SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(conn)
        .await
        .map_err(db_err("Failed to change company state"))?
        .ok_or_else(|| AppError::not_found(format!("Company {id} not found")))
    }
}
