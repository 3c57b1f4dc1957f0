//! Reset token generation and hashing.
//!
//! The raw token only ever leaves the server inside the e-mailed link; the
//! database stores its SHA-256 digest.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use hrdesk_core::error::AppError;

/// Random bytes per token.
const TOKEN_BYTES: usize = 32;

/// A newly issued reset token.
#[derive(Debug, Clone)]
pub struct ResetToken {
    /// Hex token placed in the link.
    pub raw: String,
    /// Hex SHA-256 of `raw`, stored on the user row.
    pub digest: String,
    /// When the token stops working.
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    /// Generate a token valid for `ttl`.
    pub fn generate(ttl: Duration) -> Result<Self, AppError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng()
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AppError::internal(format!("RNG failure: {e}")))?;
        let raw = hex::encode(bytes);
        Ok(Self {
            digest: digest(&raw),
            raw,
            expires_at: Utc::now() + ttl,
        })
    }
}

/// Hex SHA-256 digest of a raw token.
pub fn digest(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Whether `raw` has the shape of an issued token.
pub fn is_well_formed(raw: &str) -> bool {
    raw.len() == TOKEN_BYTES * 2 && raw.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let token = ResetToken::generate(Duration::hours(1)).unwrap();
        assert!(is_well_formed(&token.raw));
        assert_eq!(token.digest, digest(&token.raw));
        assert_ne!(token.digest, token.raw);
        assert!(token.expires_at > Utc::now() + Duration::minutes(59));
    }

    #[test]
    fn test_digest_is_stable() {
        assert_eq!(
            digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_well_formed() {
        assert!(!is_well_formed("short"));
        assert!(!is_well_formed(&"g".repeat(64)));
    }
}
