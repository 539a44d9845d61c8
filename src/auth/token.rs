// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token signing and verification.
//!
//! Tokens are compact JWTs signed with a symmetric key (HS256). The codec is
//! stateless: verification checks signature, expiry and issuer only, and
//! never consults the session registry. A cryptographically valid token whose
//! session has been revoked is an orthogonal failure mode handled by callers
//! that choose to check session liveness (see `auth::extractor`).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, TOKEN_ISSUER};

use super::{AuthError, AuthenticatedPrincipal, PrincipalIdentity, PrincipalType};

/// Signed claims embedded in every bearer token.
///
/// Created at issuance and never mutated. Trusted only after the signature
/// validates against the current signing key and `exp` is in the future.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: stringified principal id
    pub sub: String,
    /// Principal type the id is scoped to
    pub ptype: PrincipalType,
    /// Login identifier
    pub email: String,
    /// Display name
    pub name: String,
    /// Issued-at (Unix timestamp)
    pub iat: i64,
    /// Expires-at (Unix timestamp)
    pub exp: i64,
    /// Issuer, always [`TOKEN_ISSUER`]
    pub iss: String,
}

impl Claims {
    /// Parse the subject back into a numeric principal id.
    pub fn principal_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::TokenMalformed)
    }

    /// Build the typed authenticated-principal value from these claims.
    pub fn principal(&self) -> Result<AuthenticatedPrincipal, AuthError> {
        Ok(AuthenticatedPrincipal::new(
            self.ptype,
            PrincipalIdentity {
                id: self.principal_id()?,
                email: self.email.clone(),
                name: self.name.clone(),
            },
        ))
    }
}

/// A freshly signed token together with its decoded claims.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact serialized token
    pub token: String,
    /// The claims the token carries
    pub claims: Claims,
}

/// Signs and verifies bearer tokens.
///
/// Pure function of inputs, signing key and clock; holds no mutable state.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    remember_me_ttl: Duration,
    refresh_window: Option<Duration>,
}

impl TokenCodec {
    /// Build a codec from the immutable application configuration.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_ttl: Duration::minutes(config.token_ttl_minutes),
            remember_me_ttl: Duration::days(config.remember_me_ttl_days),
            refresh_window: config.refresh_window_minutes.map(Duration::minutes),
        }
    }

    /// Sign a new token for the given identity.
    ///
    /// `remember_me` selects the long lifetime instead of the default one.
    pub fn issue(
        &self,
        principal_id: i64,
        principal_type: PrincipalType,
        email: &str,
        name: &str,
        remember_me: bool,
    ) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let ttl = if remember_me {
            self.remember_me_ttl
        } else {
            self.token_ttl
        };

        let claims = Claims {
            sub: principal_id.to_string(),
            ptype: principal_type,
            email: email.to_string(),
            name: name.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: TOKEN_ISSUER.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Storage(format!("token signing failed: {e}")))?;

        Ok(IssuedToken { token, claims })
    }

    /// Parse a token, check its signature, expiry and issuer.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::TokenBadSignature,
                _ => AuthError::TokenMalformed,
            }
        })?;

        Ok(data.claims)
    }

    /// Re-issue a token for the same identity with a fresh expiry.
    ///
    /// Verification failures propagate unchanged. When a refresh window is
    /// configured and the token is still far from expiry, the original token
    /// is returned unchanged; refresh is idempotent in that case.
    pub fn refresh(&self, token: &str, remember_me: bool) -> Result<IssuedToken, AuthError> {
        let claims = self.verify(token)?;

        if let Some(window) = self.refresh_window {
            let remaining = claims.exp - Utc::now().timestamp();
            if remaining > window.num_seconds() {
                return Ok(IssuedToken {
                    token: token.to_string(),
                    claims,
                });
            }
        }

        self.issue(
            claims.principal_id()?,
            claims.ptype,
            &claims.email,
            &claims.name,
            remember_me,
        )
    }
}
