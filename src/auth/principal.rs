// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Principal types and the authenticated-principal value.
//!
//! Handlers never look identity up through untyped request context; the
//! [`AuthenticatedPrincipal`] produced by token verification is passed
//! explicitly through the call chain.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The kind of principal an identity belongs to.
///
/// Ids are unique within a type, not across types: user 5 and gamenet 5 are
/// unrelated records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalType {
    /// End-user of a gaming center
    User,
    /// Platform administrator
    Admin,
    /// Gaming-center operator
    Gamenet,
}

impl PrincipalType {
    /// Parse a principal type from string (case-insensitive).
    pub fn parse(s: &str) -> Option<PrincipalType> {
        match s.to_lowercase().as_str() {
            "user" => Some(PrincipalType::User),
            "admin" => Some(PrincipalType::Admin),
            "gamenet" => Some(PrincipalType::Gamenet),
            _ => None,
        }
    }
}

impl std::fmt::Display for PrincipalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrincipalType::User => write!(f, "user"),
            PrincipalType::Admin => write!(f, "admin"),
            PrincipalType::Gamenet => write!(f, "gamenet"),
        }
    }
}

/// Identity fields shared by every principal variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PrincipalIdentity {
    /// Numeric id, unique within the principal type
    pub id: i64,
    /// Login identifier
    pub email: String,
    /// Display name
    pub name: String,
}

/// An authenticated principal, established by token verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "identity", rename_all = "lowercase")]
pub enum AuthenticatedPrincipal {
    /// Authenticated end-user
    User(PrincipalIdentity),
    /// Authenticated administrator
    Admin(PrincipalIdentity),
    /// Authenticated gaming-center operator
    Gamenet(PrincipalIdentity),
}

impl AuthenticatedPrincipal {
    /// Build the variant matching `principal_type`.
    pub fn new(principal_type: PrincipalType, identity: PrincipalIdentity) -> Self {
        match principal_type {
            PrincipalType::User => AuthenticatedPrincipal::User(identity),
            PrincipalType::Admin => AuthenticatedPrincipal::Admin(identity),
            PrincipalType::Gamenet => AuthenticatedPrincipal::Gamenet(identity),
        }
    }

    /// The principal type tag.
    pub fn principal_type(&self) -> PrincipalType {
        match self {
            AuthenticatedPrincipal::User(_) => PrincipalType::User,
            AuthenticatedPrincipal::Admin(_) => PrincipalType::Admin,
            AuthenticatedPrincipal::Gamenet(_) => PrincipalType::Gamenet,
        }
    }

    /// The identity carried by whichever variant this is.
    pub fn identity(&self) -> &PrincipalIdentity {
        match self {
            AuthenticatedPrincipal::User(identity)
            | AuthenticatedPrincipal::Admin(identity)
            | AuthenticatedPrincipal::Gamenet(identity) => identity,
        }
    }

    /// Numeric id within the principal type.
    pub fn id(&self) -> i64 {
        self.identity().id
    }

    /// Check if this principal is an administrator.
    pub fn is_admin(&self) -> bool {
        matches!(self, AuthenticatedPrincipal::Admin(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: i64) -> PrincipalIdentity {
        PrincipalIdentity {
            id,
            email: format!("p{id}@example.com"),
            name: format!("Principal {id}"),
        }
    }

    #[test]
    fn parse_principal_type() {
        assert_eq!(PrincipalType::parse("user"), Some(PrincipalType::User));
        assert_eq!(PrincipalType::parse("ADMIN"), Some(PrincipalType::Admin));
        assert_eq!(PrincipalType::parse("Gamenet"), Some(PrincipalType::Gamenet));
        assert_eq!(PrincipalType::parse("operator"), None);
    }

    #[test]
    fn new_builds_matching_variant() {
        let principal = AuthenticatedPrincipal::new(PrincipalType::Gamenet, identity(3));
        assert_eq!(principal.principal_type(), PrincipalType::Gamenet);
        assert_eq!(principal.id(), 3);
        assert!(!principal.is_admin());
    }

    #[test]
    fn admin_variant_is_admin() {
        let principal = AuthenticatedPrincipal::new(PrincipalType::Admin, identity(1));
        assert!(principal.is_admin());
    }

    #[test]
    fn display_matches_wire_names() {
        assert_eq!(PrincipalType::User.to_string(), "user");
        assert_eq!(PrincipalType::Admin.to_string(), "admin");
        assert_eq!(PrincipalType::Gamenet.to_string(), "gamenet");
    }
}
