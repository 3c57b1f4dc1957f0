//! In-process revocation list for signed-out tokens.

use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

/// Revoked token IDs. Entries expire once the token itself could no longer
/// be valid.
#[derive(Clone)]
pub struct TokenBlocklist {
    revoked: Cache<Uuid, ()>,
}

impl std::fmt::Debug for TokenBlocklist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBlocklist")
            .field("entries", &self.revoked.entry_count())
            .finish()
    }
}

impl TokenBlocklist {
    /// Creates a blocklist for tokens that live at most `token_ttl`.
    pub fn new(token_ttl: Duration) -> Self {
        Self {
            revoked: Cache::builder()
                .time_to_live(token_ttl + Duration::from_secs(60))
                .build(),
        }
    }

    /// Revokes a token ID.
    pub async fn revoke(&self, jti: Uuid) {
        self.revoked.insert(jti, ()).await;
    }

    /// Whether a token ID has been revoked.
    pub async fn is_revoked(&self, jti: Uuid) -> bool {
        self.revoked.get(&jti).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revoke() {
        let blocklist = TokenBlocklist::new(Duration::from_secs(60));
        let jti = Uuid::new_v4();
        assert!(!blocklist.is_revoked(jti).await);
        blocklist.revoke(jti).await;
        assert!(blocklist.is_revoked(jti).await);
        assert!(!blocklist.is_revoked(Uuid::new_v4()).await);
    }
}
