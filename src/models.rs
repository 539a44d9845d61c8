// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures for the REST API. All types derive
//! `Serialize`/`Deserialize` and `ToSchema` for JSON handling and OpenAPI
//! documentation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AuthenticatedPrincipal, PrincipalType};
use crate::session::Session;

// =============================================================================
// Authentication
// =============================================================================

/// Login request. The identifier is resolved across all principal types;
/// clients do not (and cannot) say which store they expect to match.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login identifier (email).
    pub identifier: String,
    /// Plaintext secret, verified against the stored hash.
    pub password: String,
    /// Extends token and session lifetime to the remember-me window.
    #[serde(default)]
    pub remember_me: bool,
}

/// Compact summary of the authenticated principal.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrincipalSummary {
    /// Numeric id within the principal type.
    pub id: i64,
    /// Principal type.
    #[serde(rename = "type")]
    pub principal_type: PrincipalType,
    /// Login identifier.
    pub email: String,
    /// Display name.
    pub name: String,
}

impl From<&AuthenticatedPrincipal> for PrincipalSummary {
    fn from(principal: &AuthenticatedPrincipal) -> Self {
        let identity = principal.identity();
        Self {
            id: identity.id,
            principal_type: principal.principal_type(),
            email: identity.email.clone(),
            name: identity.name.clone(),
        }
    }
}

/// Successful login response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Signed bearer token for the Authorization header.
    pub token: String,
    /// The principal the token identifies.
    pub principal: PrincipalSummary,
    /// Token and session expiry.
    pub expires_at: DateTime<Utc>,
}

/// Token refresh request. The token itself travels in the Authorization
/// header like any other request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RefreshRequest {
    /// Extends the re-issued token to the remember-me lifetime.
    #[serde(default)]
    pub remember_me: bool,
}

/// Token refresh response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefreshResponse {
    /// The refreshed bearer token. May equal the presented token when the
    /// configured refresh window makes refresh a no-op far from expiry.
    pub token: String,
    /// Expiry of the returned token.
    pub expires_at: DateTime<Utc>,
}

/// Generic acknowledgment body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Credential recovery
// =============================================================================

/// Start of the credential-recovery flow.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    /// Email to issue a reset token for.
    pub email: String,
}

/// Completion of the credential-recovery flow.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    /// The reset token as delivered to the principal.
    pub token: String,
    /// Email the token was issued for.
    pub email: String,
    /// New secret.
    pub new_password: String,
    /// Must match `new_password`.
    pub confirm_password: String,
}

/// Standalone reset-token validity probe.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ValidateResetTokenRequest {
    /// The reset token to check.
    pub token: String,
}

// =============================================================================
// Sessions
// =============================================================================

/// One session as listed to its owner.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionItem {
    /// Session identifier, usable with the revoke endpoint.
    pub id: Uuid,
    /// Device / user-agent captured at login.
    pub device_info: String,
    /// Client IP captured at login.
    pub ip: String,
    /// Whether this is the session making the request.
    pub current: bool,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last time the session's token was used.
    pub last_activity_at: DateTime<Utc>,
    /// Session expiry.
    pub expires_at: DateTime<Utc>,
}

impl SessionItem {
    pub fn from_session(session: &Session, current_session_id: Uuid) -> Self {
        Self {
            id: session.id,
            device_info: session.device_info.clone(),
            ip: session.ip.clone(),
            current: session.id == current_session_id,
            created_at: session.created_at,
            last_activity_at: session.last_activity_at,
            expires_at: session.expires_at,
        }
    }
}

/// Active sessions of the requesting principal, most recent first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionItem>,
    pub total: usize,
}

/// Result of a bulk session revocation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RevokedResponse {
    /// Number of sessions that transitioned to inactive.
    pub revoked: usize,
}

// =============================================================================
// Users
// =============================================================================

/// Profile update for a user record.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// New display name.
    pub name: String,
}

/// A user record as returned to authorized callers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    /// Last successful login, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::PrincipalIdentity;

    #[test]
    fn principal_summary_carries_type_tag() {
        let principal = AuthenticatedPrincipal::new(
            PrincipalType::Gamenet,
            PrincipalIdentity {
                id: 3,
                email: "g@example.com".to_string(),
                name: "Center".to_string(),
            },
        );

        let summary = PrincipalSummary::from(&principal);
        assert_eq!(summary.id, 3);
        assert_eq!(summary.principal_type, PrincipalType::Gamenet);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["type"], "gamenet");
    }

    #[test]
    fn login_request_remember_me_defaults_to_false() {
        let request: LoginRequest = serde_json::from_str(
            r#"{"identifier":"user@example.com","password":"password123"}"#,
        )
        .unwrap();
        assert!(!request.remember_me);
    }

    #[test]
    fn session_item_marks_current() {
        let session = Session {
            id: Uuid::new_v4(),
            principal_id: 1,
            principal_type: PrincipalType::User,
            token_hash: "hash".to_string(),
            device_info: "Firefox".to_string(),
            ip: "10.0.0.1".to_string(),
            active: true,
            created_at: Utc::now(),
            last_activity_at: Utc::now(),
            expires_at: Utc::now(),
        };

        assert!(SessionItem::from_session(&session, session.id).current);
        assert!(!SessionItem::from_session(&session, Uuid::new_v4()).current);
    }
}
