// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::env;
use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use gamenet_auth_server::{
    api::router,
    auth::credentials::hash_password,
    auth::PrincipalType,
    config::{AppConfig, LOG_FORMAT_ENV},
    state::AppState,
    store::AuthStore,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let format = env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "pretty".to_string());
    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Seed an administrator account when `SEED_ADMIN_EMAIL` and
/// `SEED_ADMIN_PASSWORD` are both set. Intended for first boot of a fresh
/// store; duplicate emails on later boots are ignored.
fn seed_admin(store: &mut AuthStore) {
    let (email, password) = match (
        env::var("SEED_ADMIN_EMAIL"),
        env::var("SEED_ADMIN_PASSWORD"),
    ) {
        (Ok(email), Ok(password)) => (email, password),
        _ => return,
    };

    let hash = match hash_password(&password) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::error!(error = %err, "failed to hash seed admin password");
            return;
        }
    };

    match store.create_principal(PrincipalType::Admin, &email, "Administrator", hash) {
        Ok(record) => tracing::info!(id = record.id, %email, "seeded administrator account"),
        Err(err) => tracing::warn!(error = %err, "seed administrator was not created"),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(message) => {
            tracing::error!("configuration error: {message}");
            std::process::exit(1);
        }
    };

    let mut store = AuthStore::with_default_rbac();
    seed_admin(&mut store);

    let state = AppState::new(store, &config);
    let app = router(state);

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(err) => {
            tracing::error!(error = %err, "failed to parse bind address");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %addr, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!("Gamenet auth server listening on http://{addr} (docs at /docs)");

    if let Err(err) = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server failed");
        std::process::exit(1);
    }
}
