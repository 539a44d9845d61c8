// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RBAC schema types and the statically provisioned role catalog.

use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::PrincipalType;
use crate::store::AuthStore;

/// A named bundle of permissions.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Role {
    /// Unique role id
    pub id: i64,
    /// Unique role name, e.g. `administrator`
    pub name: String,
    /// Human-readable description
    pub description: String,
}

/// A (resource, action) pair, globally unique by name.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Permission {
    /// Unique permission id
    pub id: i64,
    /// Unique name, always `resource:action`
    pub name: String,
    /// Resource the permission applies to
    pub resource: String,
    /// Action on that resource
    pub action: String,
    /// Human-readable description
    pub description: String,
}

/// Role name assigned to a principal when it is created.
pub fn default_role_name(principal_type: PrincipalType) -> &'static str {
    match principal_type {
        PrincipalType::User => "user",
        PrincipalType::Admin => "administrator",
        PrincipalType::Gamenet => "gamenet",
    }
}

/// Install the statically provisioned roles and permission grants.
///
/// Rarely mutated at runtime; role assignment changes go through the store's
/// assign/unassign operations instead.
pub fn install_default_rbac(store: &mut AuthStore) {
    let users_view = store.insert_permission("users", "view", "View user accounts");
    let users_create = store.insert_permission("users", "create", "Create user accounts");
    let users_update = store.insert_permission("users", "update", "Update user accounts");
    let users_delete = store.insert_permission("users", "delete", "Delete user accounts");
    let gamenets_view = store.insert_permission("gamenets", "view", "View gaming centers");
    let gamenets_update = store.insert_permission("gamenets", "update", "Update gaming centers");
    let sessions_manage = store.insert_permission("sessions", "manage", "Manage own sessions");
    let roles_manage = store.insert_permission("roles", "manage", "Manage roles and grants");
    let dashboard_view = store.insert_permission("dashboard", "view", "View the admin dashboard");
    let wallet_view = store.insert_permission("wallet", "view", "View wallet balance");
    let reservation_manage =
        store.insert_permission("reservation", "manage", "Manage seat reservations");

    let administrator = store.insert_role("administrator", "Full platform access");
    for permission in [
        users_view,
        users_create,
        users_update,
        users_delete,
        gamenets_view,
        gamenets_update,
        sessions_manage,
        roles_manage,
        dashboard_view,
        wallet_view,
        reservation_manage,
    ] {
        store.grant_permission(administrator, permission);
    }

    let gamenet = store.insert_role("gamenet", "Gaming-center operator");
    for permission in [
        users_view,
        users_create,
        users_update,
        gamenets_view,
        gamenets_update,
        sessions_manage,
        dashboard_view,
        reservation_manage,
    ] {
        store.grant_permission(gamenet, permission);
    }

    // End-users carry users:view/update for their own profile; the ownership
    // rule restricts both to the principal's own record.
    let user = store.insert_role("user", "Gaming-center end-user");
    for permission in [
        reservation_manage,
        wallet_view,
        sessions_manage,
        users_view,
        users_update,
    ] {
        store.grant_permission(user, permission);
    }
}
