// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication endpoints: login, logout, refresh and credential recovery.

use axum::{extract::State, http::HeaderMap, Json};

use crate::{
    auth::{extractor::bearer_token, AuthError},
    models::{
        ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, PrincipalSummary,
        RefreshRequest, RefreshResponse, ResetPasswordRequest, ValidateResetTokenRequest,
    },
    state::AppState,
};

/// Device description captured into the session row.
fn device_info(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Client IP as reported by the reverse proxy, if any.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

/// Authenticate and open a session.
///
/// The identifier is resolved across every principal type. Failures are one
/// generic 401 regardless of whether the identifier matched any store.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let outcome = state
        .auth
        .login(
            &request.identifier,
            &request.password,
            request.remember_me,
            &device_info(&headers),
            &client_ip(&headers),
        )
        .await?;

    Ok(Json(LoginResponse {
        principal: PrincipalSummary::from(&outcome.principal),
        token: outcome.token,
        expires_at: outcome.expires_at,
    }))
}

/// Revoke the session behind the presented token. Idempotent.
#[utoipa::path(
    post,
    path = "/v1/auth/logout",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Session revoked", body = MessageResponse),
        (status = 401, description = "Invalid or expired token"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, AuthError> {
    let token = bearer_token(&headers)?;
    state.auth.logout(token).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}

/// Re-issue the presented token with a fresh expiry.
///
/// The session behind the token must still be live; tokens from revoked
/// sessions cannot be refreshed.
#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    tag = "Auth",
    security(("bearer" = [])),
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Refreshed token", body = RefreshResponse),
        (status = 401, description = "Invalid token or revoked session"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Option<Json<RefreshRequest>>,
) -> Result<Json<RefreshResponse>, AuthError> {
    let token = bearer_token(&headers)?;
    let remember_me = request.map(|Json(r)| r.remember_me).unwrap_or(false);

    let outcome = state.auth.refresh_token(token, remember_me).await?;
    Ok(Json(RefreshResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
    }))
}

/// Start credential recovery for an email.
///
/// Always answers 200 with the same body; whether the email matched a
/// principal is not observable. Delivery of the issued token is handled
/// outside this service.
#[utoipa::path(
    post,
    path = "/v1/auth/forgot-password",
    tag = "Auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Recovery started if the email exists", body = MessageResponse),
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    // The Some/None distinction stops here.
    let _ = state.auth.forgot_password(&request.email).await?;
    Ok(Json(MessageResponse::new(
        "If that email is registered, a reset token has been sent",
    )))
}

/// Complete credential recovery with a reset token.
///
/// The token is single-use; success revokes every session of the principal.
#[utoipa::path(
    post,
    path = "/v1/auth/reset-password",
    tag = "Auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "Invalid token or mismatched confirmation"),
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    state
        .auth
        .reset_password(
            &request.token,
            &request.email,
            &request.new_password,
            &request.confirm_password,
        )
        .await?;
    Ok(Json(MessageResponse::new("Password has been reset")))
}

/// Check a reset token without consuming it.
#[utoipa::path(
    post,
    path = "/v1/auth/validate-reset-token",
    tag = "Auth",
    request_body = ValidateResetTokenRequest,
    responses(
        (status = 200, description = "Token is valid", body = MessageResponse),
        (status = 400, description = "Token is unknown, used or expired"),
    )
)]
pub async fn validate_reset_token(
    State(state): State<AppState>,
    Json(request): Json<ValidateResetTokenRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    state.auth.validate_reset_token(&request.token).await?;
    Ok(Json(MessageResponse::new("Reset token is valid")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{credentials::hash_password, PrincipalType};

    async fn state_with_user() -> AppState {
        let state = AppState::for_tests();
        state
            .store
            .write()
            .await
            .create_principal(
                PrincipalType::User,
                "user@example.com",
                "Some User",
                hash_password("password123").unwrap(),
            )
            .unwrap();
        state
    }

    fn headers_with_bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn login_handler_returns_token_and_summary() {
        let state = state_with_user().await;
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::USER_AGENT,
            "test-browser".parse().unwrap(),
        );

        let Json(response) = login(
            State(state.clone()),
            headers,
            Json(LoginRequest {
                identifier: "user@example.com".to_string(),
                password: "password123".to_string(),
                remember_me: false,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.principal.email, "user@example.com");
        assert_eq!(response.principal.principal_type, PrincipalType::User);
        assert!(state.codec.verify(&response.token).is_ok());

        let session = state.sessions.find_by_token(&response.token).await.unwrap();
        assert_eq!(session.device_info, "test-browser");
    }

    #[tokio::test]
    async fn login_handler_rejects_bad_credentials() {
        let state = state_with_user().await;
        let err = login(
            State(state),
            HeaderMap::new(),
            Json(LoginRequest {
                identifier: "user@example.com".to_string(),
                password: "wrongpassword".to_string(),
                remember_me: false,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn logout_then_refresh_fails() {
        let state = state_with_user().await;
        let outcome = state
            .auth
            .login("user@example.com", "password123", false, "d", "ip")
            .await
            .unwrap();
        let headers = headers_with_bearer(&outcome.token);

        logout(State(state.clone()), headers.clone()).await.unwrap();

        let err = refresh(State(state), headers, None).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionRevoked));
    }

    #[tokio::test]
    async fn forgot_password_body_is_identical_for_unknown_email() {
        let state = state_with_user().await;

        let Json(known) = forgot_password(
            State(state.clone()),
            Json(ForgotPasswordRequest {
                email: "user@example.com".to_string(),
            }),
        )
        .await
        .unwrap();

        let Json(unknown) = forgot_password(
            State(state),
            Json(ForgotPasswordRequest {
                email: "nobody@example.com".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(known.message, unknown.message);
    }
}
