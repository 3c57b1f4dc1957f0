//! Auth handlers: sign-in, sign-up, sign-out, session, refresh, password
//! change and reset.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use hrdesk_auth::SignUp;

use crate::dto::request::{
    ChangePasswordRequest, ConfirmPasswordResetRequest, PasswordResetRequest, SignInRequest,
    SignUpRequest,
};
use crate::dto::response::{ApiResponse, MessageResponse, SessionInfoResponse, SessionResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, BearerToken, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignInRequest>,
) -> ApiResult<Json<ApiResponse<SessionResponse>>> {
    let signed_in = state.auth.sign_in(&req.email, &req.password).await?;
    Ok(Json(ApiResponse::ok(signed_in.into())))
}

/// POST /api/auth/sign-up
///
/// Creates the account and signs it in straight away.
pub async fn sign_up(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<SessionResponse>>)> {
    let data: SignUp = req.into();
    let user = state.auth.sign_up(&data).await?;
    let signed_in = state.auth.sign_in(&user.email, &data.password).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(signed_in.into())),
    ))
}

/// POST /api/auth/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.auth.sign_out(&token).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Signed out successfully",
    ))))
}

/// GET /api/auth/session
///
/// Verifies the token and returns the role as the tables resolve it now.
pub async fn session(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ApiResponse<SessionInfoResponse>>> {
    let session = state.auth.verify(&token).await?;
    Ok(Json(ApiResponse::ok(session.into())))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ApiResponse<SessionResponse>>> {
    let signed_in = state.auth.refresh(&token).await?;
    Ok(Json(ApiResponse::ok(signed_in.into())))
}

/// PUT /api/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state
        .auth
        .change_password(auth.user_id(), &req.current_password, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password changed successfully",
    ))))
}

/// POST /api/auth/password-reset
///
/// Answers the same way whether or not the address has an account.
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PasswordResetRequest>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.auth.request_password_reset(&req.email).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "If the address has an account, a reset link has been sent",
    ))))
}

/// POST /api/auth/password-reset/confirm
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ConfirmPasswordResetRequest>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state
        .auth
        .confirm_password_reset(&req.token, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Password has been reset. You can now sign in.",
    ))))
}
