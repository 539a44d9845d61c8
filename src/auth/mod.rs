// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token issuance and verification, credential handling and the login
//! orchestration for the Gamenet platform.
//!
//! ## Auth Flow
//!
//! 1. Client POSTs identifier + secret to `/v1/auth/login`
//! 2. [`AuthService`] resolves the identifier across the principal-type
//!    credential stores and verifies the Argon2id secret
//! 3. [`TokenCodec`] signs a bearer token (HS256, symmetric key from config)
//! 4. A session row is recorded for the token (see `crate::session`)
//! 5. Every later request sends `Authorization: Bearer <token>`; the
//!    [`Auth`] extractor verifies the token and checks session liveness
//!
//! ## Security
//!
//! - Login failures are a single generic error; identifiers cannot be
//!   enumerated across the user/admin/gamenet stores
//! - Raw tokens are never persisted, only SHA-256 references
//! - Token verification is stateless; session revocation is enforced by the
//!   extractor, which consults the registry

pub mod credentials;
pub mod error;
pub mod extractor;
pub mod principal;
pub mod service;
pub mod token;

pub use credentials::CredentialRecord;
pub use error::AuthError;
pub use extractor::{parse_resource_id, AdminOnly, Auth, AuthContext};
pub use principal::{AuthenticatedPrincipal, PrincipalIdentity, PrincipalType};
pub use service::{AuthService, LoginOutcome, RefreshOutcome};
pub use token::{Claims, IssuedToken, TokenCodec};
