// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Role-Based Access Control
//!
//! Permissions are granted to roles, roles are assigned to principals, and
//! every authorization decision is evaluated fail-closed against the union of
//! a principal's roles. Ownership of specific resource instances is a second,
//! independent gate layered on top.

pub mod engine;
pub mod model;

pub use engine::{PermissionEngine, PermissionSet};
pub use model::{default_role_name, install_default_rbac, Permission, Role};
