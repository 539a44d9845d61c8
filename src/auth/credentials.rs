// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential records and secret hashing.
//!
//! Secrets are stored as Argon2id hashes; raw tokens are reduced to SHA-256
//! references before they touch the persistence layer, so neither bearer
//! tokens nor reset tokens can be recovered from a stored record.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::RngCore;
use sha2::{Digest, Sha256};

use super::{AuthError, PrincipalType};

/// Order in which credential stores are consulted during unified login.
///
/// The identifier is tried against every store; the first matching record
/// whose secret verifies wins. Callers must collapse every failure along the
/// way into the single generic `InvalidCredentials` error so the response
/// never reveals which store, if any, knew the identifier.
pub const LOGIN_RESOLUTION_ORDER: [PrincipalType; 3] = [
    PrincipalType::User,
    PrincipalType::Admin,
    PrincipalType::Gamenet,
];

/// A hashed-secret record as the credential store returns it.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// Numeric principal id within its type
    pub id: i64,
    /// Login identifier
    pub email: String,
    /// Display name
    pub name: String,
    /// Argon2id hash of the secret
    pub password_hash: String,
}

/// Hash a plaintext secret with Argon2id and a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Storage(format!("password hashing failed: {e}")))
}

/// Verify a plaintext secret against a stored Argon2id hash.
///
/// An unparseable stored hash counts as a verification failure.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Reduce a token to the hex-encoded SHA-256 reference stored alongside
/// sessions and reset records.
pub fn token_reference(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate the random material for a password-reset token (32 bytes, hex).
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_accepts_correct_secret() {
        let hash = hash_password("password123").unwrap();
        assert!(verify_password("password123", &hash));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let hash = hash_password("password123").unwrap();
        assert!(!verify_password("wrongpassword", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("password123", "not-a-phc-string"));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("password123").unwrap();
        let b = hash_password("password123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn token_reference_is_stable_and_hex() {
        let a = token_reference("some.jwt.token");
        let b = token_reference("some.jwt.token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn token_reference_differs_per_token() {
        assert_ne!(token_reference("token-a"), token_reference("token-b"));
    }

    #[test]
    fn reset_tokens_are_unique() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn login_order_tries_users_first() {
        assert_eq!(LOGIN_RESOLUTION_ORDER[0], PrincipalType::User);
        assert_eq!(LOGIN_RESOLUTION_ORDER.len(), 3);
    }
}
