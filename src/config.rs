// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup and is
//! immutable afterwards. The resulting [`AppConfig`] is passed by reference
//! into the token codec and the authentication service at construction time;
//! there is no ambient global state.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_SECRET` | Symmetric signing key for bearer tokens | Required |
//! | `TOKEN_TTL_MINUTES` | Bearer token lifetime | `60` |
//! | `REMEMBER_ME_TTL_DAYS` | Token/session lifetime with remember-me | `30` |
//! | `REFRESH_WINDOW_MINUTES` | Only refresh within this window before expiry | unset (always eligible) |
//! | `RESET_TOKEN_TTL_MINUTES` | Password-reset token lifetime | `15` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

/// Environment variable name for the server bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the server bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the token signing secret.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable name for the bearer token lifetime in minutes.
pub const TOKEN_TTL_ENV: &str = "TOKEN_TTL_MINUTES";

/// Environment variable name for the remember-me lifetime in days.
pub const REMEMBER_ME_TTL_ENV: &str = "REMEMBER_ME_TTL_DAYS";

/// Environment variable name for the refresh eligibility window in minutes.
pub const REFRESH_WINDOW_ENV: &str = "REFRESH_WINDOW_MINUTES";

/// Environment variable name for the password-reset token lifetime in minutes.
pub const RESET_TOKEN_TTL_ENV: &str = "RESET_TOKEN_TTL_MINUTES";

/// Environment variable name for the logging format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Fixed issuer identifier embedded in every token this service signs.
///
/// Verification rejects tokens carrying any other issuer.
pub const TOKEN_ISSUER: &str = "gamenet-auth";

/// Immutable runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server bind address.
    pub host: String,
    /// Server bind port.
    pub port: u16,
    /// Symmetric signing key for bearer tokens.
    pub jwt_secret: String,
    /// Bearer token lifetime in minutes (without remember-me).
    pub token_ttl_minutes: i64,
    /// Token and session lifetime in days when remember-me is requested.
    pub remember_me_ttl_days: i64,
    /// If set, a token is only re-issued on refresh when it expires within
    /// this many minutes. Unset means refresh is always eligible.
    pub refresh_window_minutes: Option<i64>,
    /// Password-reset token lifetime in minutes.
    pub reset_token_ttl_minutes: i64,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Returns an error message naming the first missing or malformed
    /// variable; the caller is expected to abort startup on failure.
    pub fn from_env() -> Result<Self, String> {
        let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_or_default(PORT_ENV, 8080)?;

        let jwt_secret = env::var(JWT_SECRET_ENV)
            .map_err(|_| format!("{JWT_SECRET_ENV} must be set"))?;
        if jwt_secret.len() < 32 {
            return Err(format!("{JWT_SECRET_ENV} must be at least 32 bytes"));
        }

        Ok(Self {
            host,
            port,
            jwt_secret,
            token_ttl_minutes: parse_or_default(TOKEN_TTL_ENV, 60)?,
            remember_me_ttl_days: parse_or_default(REMEMBER_ME_TTL_ENV, 30)?,
            refresh_window_minutes: parse_optional(REFRESH_WINDOW_ENV)?,
            reset_token_ttl_minutes: parse_or_default(RESET_TOKEN_TTL_ENV, 15)?,
        })
    }

    /// Configuration suitable for tests: short-lived tokens, fixed secret.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: "test-secret-test-secret-test-secret!".to_string(),
            token_ttl_minutes: 60,
            remember_me_ttl_days: 30,
            refresh_window_minutes: None,
            reset_token_ttl_minutes: 15,
        }
    }
}

fn parse_or_default<T: std::str::FromStr>(var: &str, default: T) -> Result<T, String> {
    match env::var(var) {
        Ok(raw) => raw.parse().map_err(|_| format!("{var} is not a valid value: {raw}")),
        Err(_) => Ok(default),
    }
}

fn parse_optional<T: std::str::FromStr>(var: &str) -> Result<Option<T>, String> {
    match env::var(var) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("{var} is not a valid value: {raw}")),
        Err(_) => Ok(None),
    }
}
