// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! The `Display` implementation is precise and intended for logs. The HTTP
//! body produced by `IntoResponse` is deliberately coarser: the three token
//! failure modes share one generic message so callers cannot distinguish a
//! bad signature from an expired token, and login failures never reveal
//! whether the identifier matched any credential store.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Error type for authentication, session and permission checks.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingAuthHeader,
    /// Invalid authorization header format
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// Login failed; generic by design so identifiers cannot be enumerated
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Token could not be parsed
    #[error("Token is malformed")]
    TokenMalformed,
    /// Token expiry has passed
    #[error("Token has expired")]
    TokenExpired,
    /// Token signature did not validate against the signing key
    #[error("Token signature is invalid")]
    TokenBadSignature,
    /// Session id or token reference unknown to the registry
    #[error("Session not found")]
    SessionNotFound,
    /// Session exists but has been revoked or has expired
    #[error("Session has been revoked")]
    SessionRevoked,
    /// Role-level permission check failed
    #[error("Permission denied for {resource}:{action}")]
    PermissionDenied { resource: String, action: String },
    /// Resource-instance ownership check failed
    #[error("Not an owner of {resource} {id}")]
    OwnershipDenied { resource: String, id: i64 },
    /// Malformed request input (e.g. non-numeric resource id)
    #[error("Invalid request: {0}")]
    RequestShape(String),
    /// Reset token unknown, expired, already used, or bound to another email
    #[error("Reset token is invalid or has expired")]
    ResetTokenInvalid,
    /// Persistence failure, propagated without retry
    #[error("Storage error: {0}")]
    Storage(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidCredentials => "invalid_credentials",
            // One code for all token failures; see module docs.
            AuthError::TokenMalformed
            | AuthError::TokenExpired
            | AuthError::TokenBadSignature => "invalid_token",
            AuthError::SessionNotFound => "session_not_found",
            AuthError::SessionRevoked => "session_revoked",
            AuthError::PermissionDenied { .. } => "permission_denied",
            AuthError::OwnershipDenied { .. } => "ownership_denied",
            AuthError::RequestShape(_) => "invalid_request",
            AuthError::ResetTokenInvalid => "invalid_reset_token",
            AuthError::Storage(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidCredentials
            | AuthError::TokenMalformed
            | AuthError::TokenExpired
            | AuthError::TokenBadSignature
            | AuthError::SessionRevoked => StatusCode::UNAUTHORIZED,
            AuthError::PermissionDenied { .. } | AuthError::OwnershipDenied { .. } => {
                StatusCode::FORBIDDEN
            }
            AuthError::SessionNotFound => StatusCode::NOT_FOUND,
            AuthError::RequestShape(_) | AuthError::ResetTokenInvalid => StatusCode::BAD_REQUEST,
            AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the client.
    ///
    /// Token failures collapse into one message; storage details stay in logs.
    pub(crate) fn public_message(&self) -> String {
        match self {
            AuthError::TokenMalformed
            | AuthError::TokenExpired
            | AuthError::TokenBadSignature => "Invalid or expired token".to_string(),
            AuthError::Storage(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Storage(ref detail) = self {
            tracing::error!(error = %detail, "storage failure surfaced to client");
        }
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn invalid_credentials_returns_401() {
        let response = AuthError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "invalid_credentials");
    }

    #[tokio::test]
    async fn token_failures_share_generic_body() {
        for err in [
            AuthError::TokenMalformed,
            AuthError::TokenExpired,
            AuthError::TokenBadSignature,
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
            assert_eq!(body["error_code"], "invalid_token");
            assert_eq!(body["error"], "Invalid or expired token");
        }
    }

    #[tokio::test]
    async fn permission_denied_returns_403() {
        let response = AuthError::PermissionDenied {
            resource: "users".to_string(),
            action: "update".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn ownership_denied_returns_403() {
        let response = AuthError::OwnershipDenied {
            resource: "users".to_string(),
            id: 7,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn request_shape_returns_400() {
        let response = AuthError::RequestShape("resource id must be numeric".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn storage_error_hides_detail() {
        let response = AuthError::Storage("disk on fire".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error"], "Internal server error");
    }
}
