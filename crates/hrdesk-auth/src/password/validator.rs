//! Password policy enforcement for new passwords.

use hrdesk_core::config::AuthConfig;
use hrdesk_core::error::AppError;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length in characters.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates a password against all configured policies.
    ///
    /// `user_inputs` (e-mail, name) are penalised by the strength estimate.
    /// Returns an error describing the first violation found.
    pub fn validate(&self, password: &str, user_inputs: &[&str]) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if !password.chars().any(|c| c.is_alphabetic()) {
            return Err(AppError::validation(
                "Password must contain at least one letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::validation(
                "Password must contain at least one digit",
            ));
        }

        let estimate = zxcvbn::zxcvbn(password, user_inputs);
        if estimate.score() < zxcvbn::Score::Two {
            return Err(AppError::validation(
                "Password is too easy to guess. Please choose a stronger password.",
            ));
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_rejects_short_and_missing_classes() {
        let v = validator();
        assert!(v.validate("ab1", &[]).is_err());
        assert!(v.validate("onlyletterslong", &[]).is_err());
        assert!(v.validate("1234567890", &[]).is_err());
    }

    #[test]
    fn test_rejects_guessable() {
        assert!(validator().validate("password1", &[]).is_err());
    }

    #[test]
    fn test_accepts_strong() {
        assert!(validator().validate("violet-Harbor-93-lantern", &[]).is_ok());
    }

    #[test]
    fn test_not_same() {
        let v = validator();
        assert!(v.validate_not_same("a1", "a1").is_err());
        assert!(v.validate_not_same("a1", "b2").is_ok());
    }
}
