//! Transactions that run under the row-level-security role.
//!
//! A scoped transaction switches to the non-owner `hrdesk_api` role and sets
//! the transaction-local settings the policies read (`app.user_id`,
//! `app.role`, `app.company_id`). Both reset when the transaction ends.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use hrdesk_core::result::AppResult;
use hrdesk_entity::Principal;

use crate::db_err;

/// Database role the policies apply to.
pub const API_ROLE: &str = "hrdesk_api";

/// A transaction carrying the caller's identity.
pub type ScopedTransaction = Transaction<'static, Postgres>;

/// Begin a transaction scoped to `principal`.
pub async fn begin_scoped(pool: &PgPool, principal: &Principal) -> AppResult<ScopedTransaction> {
    let mut tx = pool
        .begin()
        .await
        .map_err(db_err("Failed to begin transaction"))?;

    sqlx::query(&format!("SET LOCAL ROLE {API_ROLE}"))
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to switch to the API role"))?;

    let settings = ScopeSettings::from(principal);
    sqlx::query(
        "SELECT set_config('app.user_id', $1, true), \
                set_config('app.role', $2, true), \
                set_config('app.company_id', $3, true)",
    )
    .bind(&settings.user_id)
    .bind(settings.role)
    .bind(&settings.company_id)
    .execute(&mut *tx)
    .await
    .map_err(db_err("Failed to set request scope"))?;

    debug!(
        user_id = %principal.user_id,
        role = %principal.role,
        company_id = ?principal.company_id,
        "Opened scoped transaction"
    );
    Ok(tx)
}

/// Commit a scoped transaction.
pub async fn commit(tx: ScopedTransaction) -> AppResult<()> {
    tx.commit()
        .await
        .map_err(db_err("Failed to commit transaction"))
}

/// Setting values exactly as written to the session.
#[derive(Debug, PartialEq, Eq)]
struct ScopeSettings {
    user_id: String,
    role: &'static str,
    company_id: String,
}

impl From<&Principal> for ScopeSettings {
    fn from(p: &Principal) -> Self {
        Self {
            user_id: p.user_id.to_string(),
            role: p.role.as_str(),
            company_id: p.company_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrdesk_entity::Role;
    use uuid::Uuid;

    #[test]
    fn test_super_admin_has_empty_company_setting() {
        let principal = Principal {
            user_id: Uuid::new_v4(),
            email: "root@hrdesk.app".to_string(),
            role: Role::SuperAdmin,
            company_id: None,
            profile_id: Uuid::new_v4(),
        };
        let settings = ScopeSettings::from(&principal);
        assert_eq!(settings.role, "super_admin");
        assert_eq!(settings.company_id, "");
        assert_eq!(settings.user_id, principal.user_id.to_string());
    }
}
