// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors forming the authorization gate.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(ctx): Auth) -> impl IntoResponse {
//!     // ctx.principal is the verified AuthenticatedPrincipal
//! }
//! ```
//!
//! The gate runs in order: Bearer extraction (absence or a malformed prefix
//! is a client error, not a token-verification error), cryptographic
//! verification through the codec, then a session-liveness check against the
//! registry. A token whose session was revoked passes verification but is
//! rejected here as unauthenticated. Permission checks are the handlers'
//! job, via `PermissionEngine::authorize`.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use uuid::Uuid;

use crate::state::AppState;

use super::{AuthError, AuthenticatedPrincipal};

/// The request-scoped result of the authorization gate.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Verified principal the request acts as
    pub principal: AuthenticatedPrincipal,
    /// The live session the presented token belongs to
    pub session_id: Uuid,
}

/// Extractor requiring a verified token with a live session.
pub struct Auth(pub AuthContext);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Middleware or a test may have established the context already.
        if let Some(ctx) = parts.extensions.get::<AuthContext>().cloned() {
            return Ok(Auth(ctx));
        }

        let token = bearer_token(&parts.headers)?;
        let claims = state.codec.verify(token)?;

        // Liveness: a cryptographically valid token from a revoked or
        // expired session is unauthenticated.
        let session = match state.sessions.find_by_token(token).await {
            Ok(session) => session,
            Err(AuthError::SessionNotFound) => return Err(AuthError::SessionRevoked),
            Err(e) => return Err(e),
        };
        if !session.is_usable() {
            return Err(AuthError::SessionRevoked);
        }

        state.sessions.touch(session.id).await;

        Ok(Auth(AuthContext {
            principal: claims.principal()?,
            session_id: session.id,
        }))
    }
}

/// Extractor that additionally requires the admin principal type.
pub struct AdminOnly(pub AuthContext);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(ctx) = Auth::from_request_parts(parts, state).await?;

        if !ctx.principal.is_admin() {
            return Err(AuthError::PermissionDenied {
                resource: "admin".to_string(),
                action: "access".to_string(),
            });
        }

        Ok(AdminOnly(ctx))
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)
}

/// Parse a path segment that must be a numeric resource id.
///
/// An empty or non-numeric id is a request-shape error and never reaches the
/// permission engine.
pub fn parse_resource_id(raw: &str) -> Result<i64, AuthError> {
    raw.parse::<i64>()
        .map_err(|_| AuthError::RequestShape(format!("resource id must be numeric, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{PrincipalIdentity, PrincipalType};
    use crate::state::AppState;
    use axum::http::Request;

    async fn state_with_login() -> (AppState, String) {
        let state = AppState::for_tests();
        {
            let mut store = state.store.write().await;
            store
                .create_principal(
                    PrincipalType::User,
                    "user@example.com",
                    "Some User",
                    crate::auth::credentials::hash_password("password123").unwrap(),
                )
                .unwrap();
        }
        let outcome = state
            .auth
            .login("user@example.com", "password123", false, "agent", "ip")
            .await
            .unwrap();
        (state, outcome.token)
    }

    fn parts_with_header(value: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let (state, _token) = state_with_login().await;
        let mut parts = parts_with_header(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn malformed_prefix_is_a_client_error() {
        let (state, token) = state_with_login().await;
        let mut parts = parts_with_header(Some(format!("Token {token}")));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn valid_token_with_live_session_authenticates() {
        let (state, token) = state_with_login().await;
        let mut parts = parts_with_header(Some(format!("Bearer {token}")));

        let Auth(ctx) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(ctx.principal.principal_type(), PrincipalType::User);
        assert_eq!(ctx.principal.identity().email, "user@example.com");
    }

    #[tokio::test]
    async fn revoked_session_is_unauthenticated_despite_valid_token() {
        let (state, token) = state_with_login().await;
        state.auth.logout(&token).await.unwrap();

        // Codec alone still accepts the token.
        assert!(state.codec.verify(&token).is_ok());

        let mut parts = parts_with_header(Some(format!("Bearer {token}")));
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::SessionRevoked)));
    }

    #[tokio::test]
    async fn extractor_prefers_preestablished_context() {
        let (state, _token) = state_with_login().await;
        let mut parts = parts_with_header(None);

        let ctx = AuthContext {
            principal: AuthenticatedPrincipal::new(
                PrincipalType::Admin,
                PrincipalIdentity {
                    id: 9,
                    email: "mw@example.com".to_string(),
                    name: "From Middleware".to_string(),
                },
            ),
            session_id: Uuid::new_v4(),
        };
        parts.extensions.insert(ctx.clone());

        let Auth(extracted) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(extracted.principal.id(), 9);
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let (state, token) = state_with_login().await;
        let mut parts = parts_with_header(Some(format!("Bearer {token}")));

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::PermissionDenied { .. })));
    }

    #[test]
    fn resource_ids_must_be_numeric() {
        assert_eq!(parse_resource_id("42").unwrap(), 42);
        assert!(matches!(
            parse_resource_id("abc").unwrap_err(),
            AuthError::RequestShape(_)
        ));
        assert!(matches!(
            parse_resource_id("").unwrap_err(),
            AuthError::RequestShape(_)
        ));
    }
}
