//! JSON body extractor that runs `validator` rules before the handler.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use hrdesk_core::error::AppError;

use crate::error::ApiError;

/// A JSON body that deserialized and passed its `#[validate]` rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        value.validate().map_err(|errors| {
            AppError::validation(format!("Invalid request: {}", summarize(&errors)))
        })?;

        Ok(Self(value))
    }
}

fn summarize(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let message = errs
                .iter()
                .find_map(|e| e.message.as_ref().map(ToString::to_string))
                .unwrap_or_else(|| "is invalid".to_string());
            format!("{field} {message}")
        })
        .collect();
    parts.sort();
    parts.join("; ")
}
