//! PBKDF2-HMAC-SHA256 password hashing.
//!
//! Stored format: `iterations:salt_hex:hash_hex` with a 16-byte salt and a
//! 32-byte derived key. Argon2 PHC strings written by earlier releases are
//! still accepted by [`PasswordHasher::verify`].

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use hrdesk_core::error::AppError;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const ARGON2_PREFIX: &str = "$argon2";

/// Hashes and verifies passwords.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    /// Creates a hasher that derives keys with `iterations` rounds.
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// Hashes a plaintext password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng()
            .try_fill_bytes(&mut salt)
            .map_err(|e| AppError::internal(format!("RNG failure: {e}")))?;

        let mut key = [0u8; HASH_LEN];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, self.iterations, &mut key);

        Ok(format!(
            "{}:{}:{}",
            self.iterations,
            hex::encode(salt),
            hex::encode(key)
        ))
    }

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch. A stored value that cannot be parsed
    /// is an internal error.
    pub fn verify(&self, password: &str, stored: &str) -> Result<bool, AppError> {
        if stored.starts_with(ARGON2_PREFIX) {
            return verify_argon2(password, stored);
        }

        let parsed = ParsedHash::parse(stored)?;
        let mut key = vec![0u8; parsed.key.len()];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), &parsed.salt, parsed.iterations, &mut key);

        Ok(constant_time_eq(&key, &parsed.key))
    }

    /// Whether `stored` should be replaced with a fresh hash: legacy
    /// formats and hashes with fewer rounds than configured.
    pub fn needs_rehash(&self, stored: &str) -> bool {
        if stored.starts_with(ARGON2_PREFIX) {
            return true;
        }
        match ParsedHash::parse(stored) {
            Ok(parsed) => parsed.iterations < self.iterations,
            Err(_) => false,
        }
    }
}

struct ParsedHash {
    iterations: u32,
    salt: Vec<u8>,
    key: Vec<u8>,
}

impl ParsedHash {
    fn parse(stored: &str) -> Result<Self, AppError> {
        let malformed = || AppError::internal("Stored password hash is malformed");

        let mut parts = stored.split(':');
        let (Some(iterations), Some(salt), Some(key), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let iterations: u32 = iterations.parse().map_err(|_| malformed())?;
        let salt = hex::decode(salt).map_err(|_| malformed())?;
        let key = hex::decode(key).map_err(|_| malformed())?;
        if iterations == 0 || salt.is_empty() || key.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            iterations,
            salt,
            key,
        })
    }
}

fn verify_argon2(password: &str, stored: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(stored)
        .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::internal(format!(
            "Password verification failed: {e}"
        ))),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher as _, SaltString, rand_core::OsRng};

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(1_000)
    }

    #[test]
    fn test_hash_format() {
        let stored = hasher().hash("violet-Harbor-93").unwrap();
        let parts: Vec<&str> = stored.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "1000");
        assert_eq!(parts[1].len(), SALT_LEN * 2);
        assert_eq!(parts[2].len(), HASH_LEN * 2);
    }

    #[test]
    fn test_verify_round_trip_and_salting() {
        let h = hasher();
        let a = h.hash("violet-Harbor-93").unwrap();
        let b = h.hash("violet-Harbor-93").unwrap();
        assert_ne!(a, b);
        assert!(h.verify("violet-Harbor-93", &a).unwrap());
        assert!(!h.verify("violet-harbor-93", &a).unwrap());
    }

    #[test]
    fn test_verify_uses_stored_iterations() {
        let stored = PasswordHasher::new(2_000).hash("pw-12345678").unwrap();
        assert!(hasher().verify("pw-12345678", &stored).unwrap());
        assert!(PasswordHasher::new(5_000).needs_rehash(&stored));
        assert!(!PasswordHasher::new(2_000).needs_rehash(&stored));
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let h = hasher();
        assert!(h.verify("x", "not-a-hash").is_err());
        assert!(h.verify("x", "1000:zz:00").is_err());
        assert!(h.verify("x", "0:00:00").is_err());
        assert!(h.verify("x", "1000:00:00:00").is_err());
    }

    #[test]
    fn test_legacy_argon2_hash_verifies() {
        let salt = SaltString::generate(&mut OsRng);
        let legacy = Argon2::default()
            .hash_password(b"old-Secret-77", &salt)
            .unwrap()
            .to_string();
        let h = hasher();
        assert!(h.verify("old-Secret-77", &legacy).unwrap());
        assert!(!h.verify("wrong", &legacy).unwrap());
        assert!(h.needs_rehash(&legacy));
    }
}
