//! `AuthUser` extractor: pulls the JWT from the Authorization header,
//! verifies it, re-resolves the role and injects the request context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use hrdesk_core::error::AppError;
use hrdesk_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// The raw bearer token of a request, unverified.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        Ok(Self(token.to_string()))
    }
}

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Context handed to the services.
    pub ctx: RequestContext,
    /// The token the request carried.
    pub token: String,
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.ctx
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        // The principal comes from the tables, not from the role claim.
        let session = state.auth.verify(&token).await?;

        let ip_address = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string());

        Ok(Self {
            ctx: RequestContext::new(session.principal, ip_address),
            token,
        })
    }
}
