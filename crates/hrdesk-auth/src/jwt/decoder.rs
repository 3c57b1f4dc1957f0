//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use hrdesk_core::config::AuthConfig;
use hrdesk_core::error::AppError;

use super::claims::Claims;

/// Clock skew tolerated on `exp`, in seconds.
const LEEWAY_SECONDS: u64 = 5;

/// Validates signature, expiry, audience and issuer of session tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = LEEWAY_SECONDS;
        validation.set_audience(&[config.jwt_audience.as_str()]);
        validation.set_issuer(&[config.jwt_issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a token string. Revocation is checked by the
    /// caller against the [`super::TokenBlocklist`].
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        use jsonwebtoken::errors::ErrorKind as JwtErrorKind;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    JwtErrorKind::ExpiredSignature => AppError::authentication("Token has expired"),
                    JwtErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    JwtErrorKind::InvalidAudience => {
                        AppError::authentication("Token was issued for a different audience")
                    }
                    JwtErrorKind::InvalidIssuer => {
                        AppError::authentication("Token was issued by an unknown issuer")
                    }
                    JwtErrorKind::InvalidToken => AppError::authentication("Invalid token format"),
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtEncoder;
    use hrdesk_core::error::ErrorKind;
    use hrdesk_entity::{Principal, Role};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    fn principal() -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            email: "kari@acme.no".to_string(),
            role: Role::Employee,
            company_id: Some(Uuid::new_v4()),
            profile_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_round_trip() {
        let config = AuthConfig::default();
        let p = principal();
        let issued = JwtEncoder::new(&config).issue(&p).unwrap();
        let claims = JwtDecoder::new(&config).decode(&issued.token).unwrap();
        assert_eq!(claims.sub, p.user_id);
        assert_eq!(claims.email, p.email);
        assert_eq!(claims.role, Role::Employee);
        assert_eq!(claims.aud, "authenticated");
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let config = AuthConfig::default();
        let issued = JwtEncoder::new(&config).issue(&principal()).unwrap();
        let mut other = config.clone();
        other.jwt_secret = "another-secret-that-is-long-enough-0000".to_string();
        let err = JwtDecoder::new(&other).decode(&issued.token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, "Invalid token signature");
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let config = AuthConfig::default();
        let mut other = config.clone();
        other.jwt_audience = "service_role".to_string();
        let issued = JwtEncoder::new(&other).issue(&principal()).unwrap();
        let err = JwtDecoder::new(&config).decode(&issued.token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = AuthConfig::default();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@b.io".to_string(),
            role: Role::Employee,
            aud: config.jwt_audience.clone(),
            iss: config.jwt_issuer.clone(),
            iat: now - 3_600,
            exp: now - 60,
            jti: Uuid::new_v4(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();
        let err = JwtDecoder::new(&config).decode(&token).unwrap_err();
        assert_eq!(err.message, "Token has expired");
    }

    #[test]
    fn test_garbage_rejected() {
        let err = JwtDecoder::new(&AuthConfig::default())
            .decode("not.a.jwt")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}
