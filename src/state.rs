// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{AuthService, TokenCodec};
use crate::config::AppConfig;
use crate::rbac::PermissionEngine;
use crate::session::SessionRegistry;
use crate::store::{AuthStore, SharedStore};

/// Shared application state handed to every handler.
///
/// Everything here is constructed once at startup from the immutable
/// [`AppConfig`]; the store behind its lock is the only mutable piece.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub codec: Arc<TokenCodec>,
    pub sessions: SessionRegistry,
    pub permissions: PermissionEngine,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(store: AuthStore, config: &AppConfig) -> Self {
        let store = store.into_shared();
        let codec = Arc::new(TokenCodec::new(config));
        let sessions = SessionRegistry::new(store.clone());
        let auth = Arc::new(AuthService::new(
            store.clone(),
            codec.clone(),
            sessions.clone(),
            config,
        ));

        Self {
            permissions: PermissionEngine::new(store.clone()),
            store,
            codec,
            sessions,
            auth,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State over a store with default RBAC, for handler tests.
    pub fn for_tests() -> Self {
        Self::new(AuthStore::with_default_rbac(), &AppConfig::for_tests())
    }
}
