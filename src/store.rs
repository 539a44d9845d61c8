// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory persistence layer for principals, sessions, RBAC tables and
//! reset tokens.
//!
//! The store is deliberately dumb: plain tables and lookups, no policy. The
//! session registry, permission engine and authentication service compose the
//! actual semantics on top and are the only writers. All access goes through
//! one `tokio::sync::RwLock` (see [`SharedStore`]); operations that must be
//! atomic with respect to concurrent logins hold a single write guard across
//! their read-then-update sequence.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{AuthError, CredentialRecord, PrincipalType};
use crate::rbac::{default_role_name, Permission, Role};
use crate::session::Session;

/// The store as shared between request handlers.
pub type SharedStore = Arc<RwLock<AuthStore>>;

/// A principal as the credential store persists it.
#[derive(Debug, Clone)]
pub struct PrincipalRecord {
    /// Numeric id, unique within the principal type
    pub id: i64,
    /// Login identifier, unique within the principal type
    pub email: String,
    /// Display name
    pub name: String,
    /// Argon2id hash of the secret
    pub password_hash: String,
    /// Last successful login
    pub last_login_at: Option<DateTime<Utc>>,
    /// Record creation time
    pub created_at: DateTime<Utc>,
}

/// A single-use password-reset token record.
#[derive(Debug, Clone)]
pub struct ResetTokenRecord {
    /// SHA-256 reference of the raw token
    pub token_hash: String,
    /// Principal the token was issued for
    pub principal_id: i64,
    /// Principal type the id is scoped to
    pub principal_type: PrincipalType,
    /// Email the token is bound to
    pub email: String,
    /// Independent expiry, much shorter than session tokens
    pub expires_at: DateTime<Utc>,
    /// Set on first successful use
    pub used: bool,
}

#[derive(Default)]
pub struct AuthStore {
    principals: HashMap<PrincipalType, HashMap<i64, PrincipalRecord>>,
    next_principal_id: HashMap<PrincipalType, i64>,
    sessions: HashMap<Uuid, Session>,
    roles: HashMap<i64, Role>,
    permissions: HashMap<i64, Permission>,
    role_permissions: HashSet<(i64, i64)>,
    role_assignments: HashSet<(PrincipalType, i64, i64)>,
    gamenet_users: HashSet<(i64, i64)>,
    reset_tokens: HashMap<String, ResetTokenRecord>,
    next_role_id: i64,
    next_permission_id: i64,
}

impl AuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with the statically provisioned roles and permissions
    /// installed. This is what production startup and most tests use.
    pub fn with_default_rbac() -> Self {
        let mut store = Self::new();
        crate::rbac::install_default_rbac(&mut store);
        store
    }

    /// Wrap a store for sharing between handlers.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    // =========================================================================
    // Principals
    // =========================================================================

    /// Create a principal and assign it the default role for its type.
    pub fn create_principal(
        &mut self,
        principal_type: PrincipalType,
        email: impl Into<String>,
        name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Result<PrincipalRecord, AuthError> {
        let email = email.into();
        if self.find_credentials(principal_type, &email).is_some() {
            return Err(AuthError::Storage(format!(
                "principal with email already exists in {principal_type} store"
            )));
        }

        let next = self.next_principal_id.entry(principal_type).or_insert(1);
        let id = *next;
        *next += 1;

        let record = PrincipalRecord {
            id,
            email,
            name: name.into(),
            password_hash: password_hash.into(),
            last_login_at: None,
            created_at: Utc::now(),
        };

        self.principals
            .entry(principal_type)
            .or_default()
            .insert(id, record.clone());

        if let Some(role_id) = self.role_id_by_name(default_role_name(principal_type)) {
            self.assign_role(principal_type, id, role_id);
        }

        Ok(record)
    }

    /// Credential-store lookup: identifier within one principal-type store.
    pub fn find_credentials(
        &self,
        principal_type: PrincipalType,
        email: &str,
    ) -> Option<CredentialRecord> {
        self.principals
            .get(&principal_type)?
            .values()
            .find(|p| p.email == email)
            .map(|p| CredentialRecord {
                id: p.id,
                email: p.email.clone(),
                name: p.name.clone(),
                password_hash: p.password_hash.clone(),
            })
    }

    pub fn principal(&self, principal_type: PrincipalType, id: i64) -> Option<&PrincipalRecord> {
        self.principals.get(&principal_type)?.get(&id)
    }

    pub fn touch_last_login(&mut self, principal_type: PrincipalType, id: i64) {
        if let Some(record) = self
            .principals
            .get_mut(&principal_type)
            .and_then(|m| m.get_mut(&id))
        {
            record.last_login_at = Some(Utc::now());
        }
    }

    pub fn update_principal_name(
        &mut self,
        principal_type: PrincipalType,
        id: i64,
        name: impl Into<String>,
    ) -> Result<(), AuthError> {
        match self
            .principals
            .get_mut(&principal_type)
            .and_then(|m| m.get_mut(&id))
        {
            Some(record) => {
                record.name = name.into();
                Ok(())
            }
            None => Err(AuthError::Storage(format!(
                "{principal_type} {id} does not exist"
            ))),
        }
    }

    pub fn set_password_hash(
        &mut self,
        principal_type: PrincipalType,
        id: i64,
        password_hash: impl Into<String>,
    ) -> Result<(), AuthError> {
        match self
            .principals
            .get_mut(&principal_type)
            .and_then(|m| m.get_mut(&id))
        {
            Some(record) => {
                record.password_hash = password_hash.into();
                Ok(())
            }
            None => Err(AuthError::Storage(format!(
                "{principal_type} {id} does not exist"
            ))),
        }
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    pub fn insert_session(&mut self, session: Session) {
        self.sessions.insert(session.id, session);
    }

    pub fn session(&self, id: Uuid) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn session_mut(&mut self, id: Uuid) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    pub fn session_by_token_hash(&self, token_hash: &str) -> Option<&Session> {
        self.sessions.values().find(|s| s.token_hash == token_hash)
    }

    pub fn session_by_token_hash_mut(&mut self, token_hash: &str) -> Option<&mut Session> {
        self.sessions
            .values_mut()
            .find(|s| s.token_hash == token_hash)
    }

    /// All sessions for one principal, active or not.
    pub fn sessions_for(
        &self,
        principal_type: PrincipalType,
        principal_id: i64,
    ) -> impl Iterator<Item = &Session> {
        self.sessions
            .values()
            .filter(move |s| s.principal_type == principal_type && s.principal_id == principal_id)
    }

    /// Mutable variant used by the registry's bulk revokes under one guard.
    pub fn sessions_for_mut(
        &mut self,
        principal_type: PrincipalType,
        principal_id: i64,
    ) -> impl Iterator<Item = &mut Session> {
        self.sessions
            .values_mut()
            .filter(move |s| s.principal_type == principal_type && s.principal_id == principal_id)
    }

    // =========================================================================
    // RBAC
    // =========================================================================

    pub fn insert_role(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> i64 {
        self.next_role_id += 1;
        let id = self.next_role_id;
        self.roles.insert(
            id,
            Role {
                id,
                name: name.into(),
                description: description.into(),
            },
        );
        id
    }

    pub fn insert_permission(
        &mut self,
        resource: impl Into<String>,
        action: impl Into<String>,
        description: impl Into<String>,
    ) -> i64 {
        let resource = resource.into();
        let action = action.into();
        self.next_permission_id += 1;
        let id = self.next_permission_id;
        self.permissions.insert(
            id,
            Permission {
                id,
                name: format!("{resource}:{action}"),
                resource,
                action,
                description: description.into(),
            },
        );
        id
    }

    /// Grant a permission to a role. The pair is unique; re-granting is a no-op.
    pub fn grant_permission(&mut self, role_id: i64, permission_id: i64) {
        self.role_permissions.insert((role_id, permission_id));
    }

    /// Assign a role to a principal. The triple is unique; re-assigning is a no-op.
    pub fn assign_role(&mut self, principal_type: PrincipalType, principal_id: i64, role_id: i64) {
        self.role_assignments
            .insert((principal_type, principal_id, role_id));
    }

    /// Remove a role assignment (administrative action).
    pub fn unassign_role(
        &mut self,
        principal_type: PrincipalType,
        principal_id: i64,
        role_id: i64,
    ) {
        self.role_assignments
            .remove(&(principal_type, principal_id, role_id));
    }

    pub fn role_id_by_name(&self, name: &str) -> Option<i64> {
        self.roles
            .values()
            .find(|role| role.name == name)
            .map(|role| role.id)
    }

    /// Role ids assigned to one principal.
    pub fn role_ids_for(&self, principal_type: PrincipalType, principal_id: i64) -> Vec<i64> {
        self.role_assignments
            .iter()
            .filter(|(ptype, pid, _)| *ptype == principal_type && *pid == principal_id)
            .map(|(_, _, role_id)| *role_id)
            .collect()
    }

    /// Permissions granted to one role.
    pub fn permissions_for_role(&self, role_id: i64) -> Vec<&Permission> {
        self.role_permissions
            .iter()
            .filter(|(rid, _)| *rid == role_id)
            .filter_map(|(_, pid)| self.permissions.get(pid))
            .collect()
    }

    // =========================================================================
    // Gamenet ownership links
    // =========================================================================

    /// Link a user to the gaming center that manages it.
    pub fn link_gamenet_user(&mut self, gamenet_id: i64, user_id: i64) {
        self.gamenet_users.insert((gamenet_id, user_id));
    }

    pub fn gamenet_owns_user(&self, gamenet_id: i64, user_id: i64) -> bool {
        self.gamenet_users.contains(&(gamenet_id, user_id))
    }

    // =========================================================================
    // Reset tokens
    // =========================================================================

    pub fn insert_reset_token(&mut self, record: ResetTokenRecord) {
        self.reset_tokens.insert(record.token_hash.clone(), record);
    }

    pub fn reset_token(&self, token_hash: &str) -> Option<&ResetTokenRecord> {
        self.reset_tokens.get(token_hash)
    }

    pub fn reset_token_mut(&mut self, token_hash: &str) -> Option<&mut ResetTokenRecord> {
        self.reset_tokens.get_mut(token_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_principal_assigns_ids_per_type() {
        let mut store = AuthStore::with_default_rbac();
        let user = store
            .create_principal(PrincipalType::User, "u@example.com", "U", "hash")
            .unwrap();
        let gamenet = store
            .create_principal(PrincipalType::Gamenet, "g@example.com", "G", "hash")
            .unwrap();

        // Ids are unique within a type, not across types.
        assert_eq!(user.id, 1);
        assert_eq!(gamenet.id, 1);
    }

    #[test]
    fn create_principal_rejects_duplicate_email_within_type() {
        let mut store = AuthStore::with_default_rbac();
        store
            .create_principal(PrincipalType::User, "u@example.com", "U", "hash")
            .unwrap();
        let err = store.create_principal(PrincipalType::User, "u@example.com", "U2", "hash");
        assert!(err.is_err());

        // Same email in a different store is fine.
        assert!(store
            .create_principal(PrincipalType::Admin, "u@example.com", "A", "hash")
            .is_ok());
    }

    #[test]
    fn create_principal_assigns_default_role() {
        let mut store = AuthStore::with_default_rbac();
        let user = store
            .create_principal(PrincipalType::User, "u@example.com", "U", "hash")
            .unwrap();

        let roles = store.role_ids_for(PrincipalType::User, user.id);
        assert_eq!(roles.len(), 1);
        assert_eq!(
            Some(roles[0]),
            store.role_id_by_name(default_role_name(PrincipalType::User))
        );
    }

    #[test]
    fn find_credentials_scopes_by_type() {
        let mut store = AuthStore::with_default_rbac();
        store
            .create_principal(PrincipalType::Admin, "root@example.com", "Root", "hash")
            .unwrap();

        assert!(store
            .find_credentials(PrincipalType::Admin, "root@example.com")
            .is_some());
        assert!(store
            .find_credentials(PrincipalType::User, "root@example.com")
            .is_none());
    }

    #[test]
    fn gamenet_user_links() {
        let mut store = AuthStore::new();
        store.link_gamenet_user(1, 5);
        assert!(store.gamenet_owns_user(1, 5));
        assert!(!store.gamenet_owns_user(1, 7));
        assert!(!store.gamenet_owns_user(2, 5));
    }

    #[test]
    fn grants_and_assignments_are_idempotent() {
        let mut store = AuthStore::new();
        let role = store.insert_role("tester", "test role");
        let perm = store.insert_permission("widgets", "poke", "poke widgets");

        store.grant_permission(role, perm);
        store.grant_permission(role, perm);
        assert_eq!(store.permissions_for_role(role).len(), 1);

        store.assign_role(PrincipalType::User, 1, role);
        store.assign_role(PrincipalType::User, 1, role);
        assert_eq!(store.role_ids_for(PrincipalType::User, 1).len(), 1);

        store.unassign_role(PrincipalType::User, 1, role);
        assert!(store.role_ids_for(PrincipalType::User, 1).is_empty());
    }
}
