// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login, logout, refresh and credential-recovery orchestration.
//!
//! Login resolves the identifier across every principal-type credential store
//! in a fixed order (see [`LOGIN_RESOLUTION_ORDER`]); the first record whose
//! secret verifies wins. Whether the identifier matched zero stores or the
//! secret failed in one of them, the caller sees the same generic
//! `InvalidCredentials`, so responses cannot be used to enumerate accounts.
//!
//! Refresh policy: a token is only refreshed while its session is still
//! active and unexpired. The codec alone would happily re-sign a token from a
//! revoked session; the service closes that gap.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::session::SessionRegistry;
use crate::store::{ResetTokenRecord, SharedStore};

use super::credentials::{
    generate_reset_token, hash_password, token_reference, verify_password,
    LOGIN_RESOLUTION_ORDER,
};
use super::token::{Claims, TokenCodec};
use super::{AuthError, AuthenticatedPrincipal, PrincipalIdentity, PrincipalType};

/// Everything a successful login hands back to the HTTP layer.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed bearer token
    pub token: String,
    /// The authenticated principal the token identifies
    pub principal: AuthenticatedPrincipal,
    /// The session created for this token
    pub session_id: Uuid,
    /// Token and session expiry
    pub expires_at: DateTime<Utc>,
}

/// Result of a token refresh.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// The (possibly re-issued) bearer token
    pub token: String,
    /// Expiry of that token
    pub expires_at: DateTime<Utc>,
}

/// Orchestrates the credential stores, token codec and session registry.
pub struct AuthService {
    store: SharedStore,
    codec: Arc<TokenCodec>,
    sessions: SessionRegistry,
    reset_token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        store: SharedStore,
        codec: Arc<TokenCodec>,
        sessions: SessionRegistry,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            codec,
            sessions,
            reset_token_ttl: Duration::minutes(config.reset_token_ttl_minutes),
        }
    }

    /// Authenticate an identifier/secret pair and open a session.
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
        remember_me: bool,
        device_info: &str,
        ip: &str,
    ) -> Result<LoginOutcome, AuthError> {
        let matched = {
            let mut store = self.store.write().await;

            let mut matched = None;
            for principal_type in LOGIN_RESOLUTION_ORDER {
                if let Some(record) = store.find_credentials(principal_type, identifier) {
                    if verify_password(secret, &record.password_hash) {
                        matched = Some((principal_type, record));
                        break;
                    }
                    // Identifier known here but the secret failed; keep
                    // scanning so the outcome is indistinguishable from an
                    // unknown identifier.
                }
            }

            match matched {
                Some((principal_type, record)) => {
                    store.touch_last_login(principal_type, record.id);
                    (principal_type, record)
                }
                None => {
                    tracing::debug!(identifier, "login failed");
                    return Err(AuthError::InvalidCredentials);
                }
            }
        };

        let (principal_type, record) = matched;
        let issued = self.codec.issue(
            record.id,
            principal_type,
            &record.email,
            &record.name,
            remember_me,
        )?;
        let expires_at = timestamp_to_datetime(issued.claims.exp)?;

        let session = self
            .sessions
            .create(
                record.id,
                principal_type,
                &issued.token,
                expires_at,
                device_info,
                ip,
            )
            .await;

        tracing::info!(
            principal_type = %principal_type,
            principal_id = record.id,
            session_id = %session.id,
            "login succeeded"
        );

        Ok(LoginOutcome {
            token: issued.token,
            principal: AuthenticatedPrincipal::new(
                principal_type,
                PrincipalIdentity {
                    id: record.id,
                    email: record.email,
                    name: record.name,
                },
            ),
            session_id: session.id,
            expires_at,
        })
    }

    /// Revoke the session behind a token. Idempotent: logging out twice, or
    /// logging out a session someone already revoked, succeeds quietly.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let _claims = self.codec.verify(token)?;

        match self.sessions.find_by_token(token).await {
            Ok(session) => self.sessions.revoke(session.id).await,
            Err(AuthError::SessionNotFound) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Re-issue a token with a fresh expiry.
    ///
    /// Requires the underlying session to still be usable; a revoked or
    /// expired session cannot be resurrected through refresh. When the codec
    /// returns the token unchanged (far from expiry under a configured
    /// refresh window), the session is left as is.
    pub async fn refresh_token(
        &self,
        token: &str,
        remember_me: bool,
    ) -> Result<RefreshOutcome, AuthError> {
        let _claims = self.codec.verify(token)?;

        let session = self.sessions.find_by_token(token).await?;
        if !session.is_usable() {
            return Err(AuthError::SessionRevoked);
        }

        let issued = self.codec.refresh(token, remember_me)?;
        let expires_at = timestamp_to_datetime(issued.claims.exp)?;

        if issued.token != token {
            self.sessions
                .rebind_token(session.id, &issued.token, expires_at)
                .await?;
        } else {
            self.sessions.touch(session.id).await;
        }

        Ok(RefreshOutcome {
            token: issued.token,
            expires_at,
        })
    }

    /// Thin wrapper over the codec for the authorization layer.
    ///
    /// Deliberately does not consult the session registry; callers that need
    /// liveness combine this with a registry lookup.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.codec.verify(token)
    }

    /// Start the credential-recovery flow for an email.
    ///
    /// Returns the raw reset token when the email matched some principal, or
    /// `None` when it matched nothing. Delivery is the caller's concern; the
    /// HTTP layer responds identically in both cases so this flow leaks no
    /// account existence either.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<String>, AuthError> {
        let mut store = self.store.write().await;

        let matched = LOGIN_RESOLUTION_ORDER
            .into_iter()
            .find_map(|ptype| store.find_credentials(ptype, email).map(|r| (ptype, r)));

        let Some((principal_type, record)) = matched else {
            return Ok(None);
        };

        let raw_token = generate_reset_token();
        store.insert_reset_token(ResetTokenRecord {
            token_hash: token_reference(&raw_token),
            principal_id: record.id,
            principal_type,
            email: record.email,
            expires_at: Utc::now() + self.reset_token_ttl,
            used: false,
        });

        tracing::info!(principal_type = %principal_type, principal_id = record.id, "reset token issued");
        Ok(Some(raw_token))
    }

    /// Complete the credential-recovery flow.
    ///
    /// The reset token is single-use. On success the new secret replaces the
    /// old one and every session of the principal is revoked, forcing
    /// re-login everywhere. Validation, password swap, token consumption and
    /// session revocation all happen under one write guard.
    pub async fn reset_password(
        &self,
        reset_token: &str,
        email: &str,
        new_secret: &str,
        confirm_secret: &str,
    ) -> Result<(), AuthError> {
        if new_secret != confirm_secret {
            return Err(AuthError::RequestShape(
                "password confirmation does not match".to_string(),
            ));
        }
        if new_secret.is_empty() {
            return Err(AuthError::RequestShape("password must not be empty".to_string()));
        }

        let new_hash = hash_password(new_secret)?;
        let token_hash = token_reference(reset_token);

        let mut store = self.store.write().await;

        let (principal_type, principal_id) = match store.reset_token(&token_hash) {
            Some(record) if !record.used && record.expires_at > Utc::now() && record.email == email => {
                (record.principal_type, record.principal_id)
            }
            _ => return Err(AuthError::ResetTokenInvalid),
        };

        store.set_password_hash(principal_type, principal_id, new_hash)?;
        if let Some(record) = store.reset_token_mut(&token_hash) {
            record.used = true;
        }
        for session in store.sessions_for_mut(principal_type, principal_id) {
            session.active = false;
        }

        tracing::info!(principal_type = %principal_type, principal_id, "password reset completed");
        Ok(())
    }

    /// Check a reset token without consuming it.
    pub async fn validate_reset_token(&self, reset_token: &str) -> Result<(), AuthError> {
        let token_hash = token_reference(reset_token);
        match self.store.read().await.reset_token(&token_hash) {
            Some(record) if !record.used && record.expires_at > Utc::now() => Ok(()),
            _ => Err(AuthError::ResetTokenInvalid),
        }
    }
}

fn timestamp_to_datetime(ts: i64) -> Result<DateTime<Utc>, AuthError> {
    Utc.timestamp_opt(ts, 0)
        .single()
        .ok_or(AuthError::TokenMalformed)
}
