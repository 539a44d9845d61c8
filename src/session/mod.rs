// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-device session tracking.
//!
//! One session record exists per issued token. Records are soft-revoked
//! (`active = false`), never physically deleted by normal operation, so the
//! audit trail of issued tokens survives revocation. Session liveness is
//! independent of a token's cryptographic validity: the codec can still
//! verify a token whose session was revoked, and callers that consult the
//! registry must treat such a token as unauthenticated.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{credentials::token_reference, AuthError, PrincipalType};
use crate::store::SharedStore;

/// A persisted, revocable record of one issued token's lifecycle.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Session {
    /// Unique session identifier
    pub id: Uuid,
    /// Principal the token was issued to
    pub principal_id: i64,
    /// Principal type the id is scoped to
    pub principal_type: PrincipalType,
    /// SHA-256 reference of the issued token; the raw token is never stored
    #[serde(skip)]
    pub token_hash: String,
    /// Device / user-agent description captured at login
    pub device_info: String,
    /// Client IP captured at login
    pub ip: String,
    /// False once revoked
    pub active: bool,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// Updated every time the session's token is used
    pub last_activity_at: DateTime<Utc>,
    /// Aligned with the token's expiry
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is usable only while active and unexpired.
    pub fn is_usable(&self) -> bool {
        self.active && self.expires_at > Utc::now()
    }
}

/// Registry of issued sessions, backed by the shared store.
///
/// The bulk revocation operations hold a single write guard across their
/// read-then-update sequence, so a concurrent login for the same principal
/// either lands entirely before the revoke (and is revoked with the rest) or
/// entirely after it (and survives). No partially revoked set is observable.
#[derive(Clone)]
pub struct SessionRegistry {
    store: SharedStore,
}

impl SessionRegistry {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Insert a session row for a freshly issued token.
    pub async fn create(
        &self,
        principal_id: i64,
        principal_type: PrincipalType,
        token: &str,
        expires_at: DateTime<Utc>,
        device_info: &str,
        ip: &str,
    ) -> Session {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            principal_id,
            principal_type,
            token_hash: token_reference(token),
            device_info: device_info.to_string(),
            ip: ip.to_string(),
            active: true,
            created_at: now,
            last_activity_at: now,
            expires_at,
        };

        self.store.write().await.insert_session(session.clone());
        session
    }

    /// Look a session up by the token it was issued for.
    pub async fn find_by_token(&self, token: &str) -> Result<Session, AuthError> {
        self.store
            .read()
            .await
            .session_by_token_hash(&token_reference(token))
            .cloned()
            .ok_or(AuthError::SessionNotFound)
    }

    /// Active sessions for a principal, most recent first.
    pub async fn list_active(
        &self,
        principal_type: PrincipalType,
        principal_id: i64,
    ) -> Vec<Session> {
        let store = self.store.read().await;
        let mut sessions: Vec<Session> = store
            .sessions_for(principal_type, principal_id)
            .filter(|s| s.is_usable())
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions
    }

    /// Record activity on a session.
    pub async fn touch(&self, session_id: Uuid) {
        if let Some(session) = self.store.write().await.session_mut(session_id) {
            session.last_activity_at = Utc::now();
        }
    }

    /// Revoke one session. Revoking an already-revoked session is a no-op.
    pub async fn revoke(&self, session_id: Uuid) -> Result<(), AuthError> {
        match self.store.write().await.session_mut(session_id) {
            Some(session) => {
                session.active = false;
                Ok(())
            }
            None => Err(AuthError::SessionNotFound),
        }
    }

    /// Revoke every active session of a principal except the current one.
    ///
    /// Returns the number of sessions revoked. The current session is left
    /// untouched even if it was already revoked; this never revives it.
    pub async fn revoke_all_except_current(
        &self,
        principal_type: PrincipalType,
        principal_id: i64,
        current_session_id: Uuid,
    ) -> usize {
        let mut store = self.store.write().await;
        let mut revoked = 0;
        for session in store.sessions_for_mut(principal_type, principal_id) {
            if session.id != current_session_id && session.active {
                session.active = false;
                revoked += 1;
            }
        }
        revoked
    }

    /// Revoke every active session of a principal.
    pub async fn revoke_all(
        &self,
        principal_type: PrincipalType,
        principal_id: i64,
    ) -> usize {
        let mut store = self.store.write().await;
        let mut revoked = 0;
        for session in store.sessions_for_mut(principal_type, principal_id) {
            if session.active {
                session.active = false;
                revoked += 1;
            }
        }
        revoked
    }

    /// Re-point a session at a refreshed token and its new expiry.
    pub async fn rebind_token(
        &self,
        session_id: Uuid,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        match self.store.write().await.session_mut(session_id) {
            Some(session) => {
                session.token_hash = token_reference(new_token);
                session.expires_at = new_expires_at;
                session.last_activity_at = Utc::now();
                Ok(())
            }
            None => Err(AuthError::SessionNotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AuthStore;
    use chrono::Duration;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(AuthStore::new().into_shared())
    }

    fn expiry() -> DateTime<Utc> {
        Utc::now() + Duration::hours(1)
    }

    #[tokio::test]
    async fn create_then_find_by_token() {
        let registry = registry();
        let created = registry
            .create(1, PrincipalType::User, "token-a", expiry(), "Firefox", "10.0.0.1")
            .await;

        let found = registry.find_by_token("token-a").await.unwrap();
        assert_eq!(found.id, created.id);
        assert!(found.active);
        assert_eq!(found.device_info, "Firefox");
        assert_eq!(found.ip, "10.0.0.1");
    }

    #[tokio::test]
    async fn find_by_unknown_token_is_not_found() {
        let err = registry().find_by_token("nope").await.unwrap_err();
        assert!(matches!(err, AuthError::SessionNotFound));
    }

    #[tokio::test]
    async fn revoke_marks_inactive_but_keeps_row() {
        let registry = registry();
        let session = registry
            .create(1, PrincipalType::User, "token-a", expiry(), "d", "ip")
            .await;

        registry.revoke(session.id).await.unwrap();

        // Soft revoke: the row survives and is still findable by token.
        let found = registry.find_by_token("token-a").await.unwrap();
        assert!(!found.active);
        assert!(!found.is_usable());
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let registry = registry();
        let session = registry
            .create(1, PrincipalType::User, "token-a", expiry(), "d", "ip")
            .await;

        registry.revoke(session.id).await.unwrap();
        registry.revoke(session.id).await.unwrap();
        assert!(!registry.find_by_token("token-a").await.unwrap().active);
    }

    #[tokio::test]
    async fn revoke_unknown_session_is_not_found() {
        let err = registry().revoke(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionNotFound));
    }

    #[tokio::test]
    async fn list_active_is_most_recent_first_and_skips_revoked() {
        let registry = registry();
        let first = registry
            .create(1, PrincipalType::User, "t1", expiry(), "d", "ip")
            .await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = registry
            .create(1, PrincipalType::User, "t2", expiry(), "d", "ip")
            .await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let third = registry
            .create(1, PrincipalType::User, "t3", expiry(), "d", "ip")
            .await;

        registry.revoke(second.id).await.unwrap();

        let active = registry.list_active(PrincipalType::User, 1).await;
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id, third.id);
        assert_eq!(active[1].id, first.id);
    }

    #[tokio::test]
    async fn list_active_scopes_by_principal() {
        let registry = registry();
        registry
            .create(1, PrincipalType::User, "t1", expiry(), "d", "ip")
            .await;
        registry
            .create(1, PrincipalType::Gamenet, "t2", expiry(), "d", "ip")
            .await;

        assert_eq!(registry.list_active(PrincipalType::User, 1).await.len(), 1);
        assert_eq!(registry.list_active(PrincipalType::Gamenet, 1).await.len(), 1);
        assert_eq!(registry.list_active(PrincipalType::Admin, 1).await.len(), 0);
    }

    #[tokio::test]
    async fn revoke_all_except_current_keeps_exactly_one() {
        let registry = registry();
        registry
            .create(1, PrincipalType::User, "t1", expiry(), "d", "ip")
            .await;
        let current = registry
            .create(1, PrincipalType::User, "t2", expiry(), "d", "ip")
            .await;
        registry
            .create(1, PrincipalType::User, "t3", expiry(), "d", "ip")
            .await;

        let revoked = registry
            .revoke_all_except_current(PrincipalType::User, 1, current.id)
            .await;
        assert_eq!(revoked, 2);

        let active = registry.list_active(PrincipalType::User, 1).await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, current.id);
    }

    #[tokio::test]
    async fn revoke_all_except_does_not_revive_revoked_current() {
        let registry = registry();
        let current = registry
            .create(1, PrincipalType::User, "t1", expiry(), "d", "ip")
            .await;
        registry
            .create(1, PrincipalType::User, "t2", expiry(), "d", "ip")
            .await;

        registry.revoke(current.id).await.unwrap();
        registry
            .revoke_all_except_current(PrincipalType::User, 1, current.id)
            .await;

        // Nothing crashed and the current session stayed revoked.
        assert!(registry.list_active(PrincipalType::User, 1).await.is_empty());
    }

    #[tokio::test]
    async fn revoke_all_revokes_everything() {
        let registry = registry();
        for token in ["t1", "t2", "t3"] {
            registry
                .create(1, PrincipalType::User, token, expiry(), "d", "ip")
                .await;
        }

        let revoked = registry.revoke_all(PrincipalType::User, 1).await;
        assert_eq!(revoked, 3);
        assert!(registry.list_active(PrincipalType::User, 1).await.is_empty());
    }

    #[tokio::test]
    async fn expired_session_is_not_usable() {
        let registry = registry();
        registry
            .create(
                1,
                PrincipalType::User,
                "t1",
                Utc::now() - Duration::minutes(1),
                "d",
                "ip",
            )
            .await;

        // Still findable (audit trail), just not usable or listed.
        let session = registry.find_by_token("t1").await.unwrap();
        assert!(session.active);
        assert!(!session.is_usable());
        assert!(registry.list_active(PrincipalType::User, 1).await.is_empty());
    }

    #[tokio::test]
    async fn rebind_token_moves_the_reference() {
        let registry = registry();
        let session = registry
            .create(1, PrincipalType::User, "old", expiry(), "d", "ip")
            .await;

        registry
            .rebind_token(session.id, "new", expiry())
            .await
            .unwrap();

        assert!(matches!(
            registry.find_by_token("old").await.unwrap_err(),
            AuthError::SessionNotFound
        ));
        assert_eq!(registry.find_by_token("new").await.unwrap().id, session.id);
    }
}
