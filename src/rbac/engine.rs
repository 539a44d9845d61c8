// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permission evaluation.
//!
//! Two independent gates compose here. The role gate (`check`) unions the
//! permissions of every role assigned to a principal and asks whether a
//! (resource, action) pair is in the union; a principal with zero roles is
//! denied by default. The ownership gate (`ownership_check`) restricts which
//! specific resource instances a principal may act on. `authorize` requires
//! both to pass when a resource id is in play.
//!
//! Request-shape validation (empty or non-numeric resource ids) is not an
//! authorization concern and is rejected at the HTTP layer before any call
//! lands here.

use std::collections::HashSet;

use crate::auth::{AuthError, AuthenticatedPrincipal, PrincipalType};
use crate::store::SharedStore;

/// The resolved permission union of one principal.
///
/// Computed once per request and queried as many times as the request needs;
/// never cached across requests, to avoid serving stale grants.
#[derive(Debug, Clone)]
pub struct PermissionSet {
    grants: HashSet<(String, String)>,
}

impl PermissionSet {
    /// Whether the set contains the (resource, action) pair.
    pub fn allows(&self, resource: &str, action: &str) -> bool {
        self.grants
            .contains(&(resource.to_string(), action.to_string()))
    }

    /// Number of distinct grants (diagnostics).
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

/// Evaluates role permissions and resource ownership.
#[derive(Clone)]
pub struct PermissionEngine {
    store: SharedStore,
}

impl PermissionEngine {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Resolve the permission union of every role assigned to the principal.
    pub async fn resolve(
        &self,
        principal_type: PrincipalType,
        principal_id: i64,
    ) -> Result<PermissionSet, AuthError> {
        let store = self.store.read().await;
        let mut grants = HashSet::new();
        for role_id in store.role_ids_for(principal_type, principal_id) {
            for permission in store.permissions_for_role(role_id) {
                grants.insert((permission.resource.clone(), permission.action.clone()));
            }
        }
        Ok(PermissionSet { grants })
    }

    /// Role-level check: is (resource, action) granted to the principal?
    pub async fn check(
        &self,
        principal_type: PrincipalType,
        principal_id: i64,
        resource: &str,
        action: &str,
    ) -> Result<bool, AuthError> {
        let permissions = self.resolve(principal_type, principal_id).await?;
        Ok(permissions.allows(resource, action))
    }

    /// Instance-level check: does the principal own this specific resource?
    ///
    /// Type-specific rule table: an administrator owns everything; a gamenet
    /// owns its own record and the users linked to it; a user owns only its
    /// own record. Unknown combinations are denied.
    pub async fn ownership_check(
        &self,
        principal_type: PrincipalType,
        resource_type: &str,
        resource_id: i64,
        principal_id: i64,
    ) -> Result<bool, AuthError> {
        match principal_type {
            PrincipalType::Admin => Ok(true),
            PrincipalType::Gamenet => match resource_type {
                "users" => Ok(self
                    .store
                    .read()
                    .await
                    .gamenet_owns_user(principal_id, resource_id)),
                "gamenets" => Ok(resource_id == principal_id),
                _ => Ok(false),
            },
            PrincipalType::User => match resource_type {
                "users" => Ok(resource_id == principal_id),
                _ => Ok(false),
            },
        }
    }

    /// Combined gate: role check, then ownership when a resource id is given.
    ///
    /// Errors are terminal for the request; `PermissionDenied` and
    /// `OwnershipDenied` map to 403 at the HTTP boundary.
    pub async fn authorize(
        &self,
        principal: &AuthenticatedPrincipal,
        resource: &str,
        action: &str,
        resource_id: Option<i64>,
    ) -> Result<(), AuthError> {
        let principal_type = principal.principal_type();
        let principal_id = principal.id();

        if !self
            .check(principal_type, principal_id, resource, action)
            .await?
        {
            return Err(AuthError::PermissionDenied {
                resource: resource.to_string(),
                action: action.to_string(),
            });
        }

        if let Some(id) = resource_id {
            if !self
                .ownership_check(principal_type, resource, id, principal_id)
                .await?
            {
                return Err(AuthError::OwnershipDenied {
                    resource: resource.to_string(),
                    id,
                });
            }
        }

        Ok(())
    }
}
