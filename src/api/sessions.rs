// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session-management endpoints.
//!
//! Principals manage their own sessions here: list active devices, revoke a
//! single session, log out everywhere else, or log out everywhere. Every
//! handler passes the `sessions:manage` role gate before touching the
//! registry.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    auth::{Auth, AuthError},
    models::{RevokedResponse, SessionItem, SessionListResponse},
    state::AppState,
};

/// List the requesting principal's active sessions, most recent first.
#[utoipa::path(
    get,
    path = "/v1/sessions",
    tag = "Sessions",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Active sessions", body = SessionListResponse),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Missing sessions:manage permission"),
    )
)]
pub async fn list_sessions(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<SessionListResponse>, AuthError> {
    state
        .permissions
        .authorize(&ctx.principal, "sessions", "manage", None)
        .await?;

    let sessions = state
        .sessions
        .list_active(ctx.principal.principal_type(), ctx.principal.id())
        .await;

    let items: Vec<SessionItem> = sessions
        .iter()
        .map(|s| SessionItem::from_session(s, ctx.session_id))
        .collect();

    Ok(Json(SessionListResponse {
        total: items.len(),
        sessions: items,
    }))
}

/// Revoke one of the requesting principal's sessions by id.
///
/// Sessions belonging to other principals are reported as not found rather
/// than forbidden, so session ids cannot be probed.
#[utoipa::path(
    delete,
    path = "/v1/sessions/{session_id}",
    tag = "Sessions",
    security(("bearer" = [])),
    params(("session_id" = String, Path, description = "Session to revoke")),
    responses(
        (status = 200, description = "Session revoked", body = RevokedResponse),
        (status = 400, description = "Malformed session id"),
        (status = 404, description = "No such session for this principal"),
    )
)]
pub async fn revoke_session(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(session_id): Path<String>,
) -> Result<Json<RevokedResponse>, AuthError> {
    state
        .permissions
        .authorize(&ctx.principal, "sessions", "manage", None)
        .await?;

    let session_id: Uuid = session_id
        .parse()
        .map_err(|_| AuthError::RequestShape("session id must be a UUID".to_string()))?;

    {
        let store = state.store.read().await;
        let owned = store
            .session(session_id)
            .map(|s| {
                s.principal_type == ctx.principal.principal_type()
                    && s.principal_id == ctx.principal.id()
            })
            .unwrap_or(false);
        if !owned {
            return Err(AuthError::SessionNotFound);
        }
    }

    state.sessions.revoke(session_id).await?;
    Ok(Json(RevokedResponse { revoked: 1 }))
}

/// Revoke every session of the requesting principal except the current one.
#[utoipa::path(
    post,
    path = "/v1/sessions/revoke-others",
    tag = "Sessions",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Other sessions revoked", body = RevokedResponse),
        (status = 401, description = "Unauthenticated"),
    )
)]
pub async fn revoke_other_sessions(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<RevokedResponse>, AuthError> {
    state
        .permissions
        .authorize(&ctx.principal, "sessions", "manage", None)
        .await?;

    let revoked = state
        .sessions
        .revoke_all_except_current(
            ctx.principal.principal_type(),
            ctx.principal.id(),
            ctx.session_id,
        )
        .await;

    Ok(Json(RevokedResponse { revoked }))
}

/// Revoke every session of the requesting principal, the current one included.
#[utoipa::path(
    post,
    path = "/v1/sessions/revoke-all",
    tag = "Sessions",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All sessions revoked", body = RevokedResponse),
        (status = 401, description = "Unauthenticated"),
    )
)]
pub async fn revoke_all_sessions(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<RevokedResponse>, AuthError> {
    state
        .permissions
        .authorize(&ctx.principal, "sessions", "manage", None)
        .await?;

    let revoked = state
        .sessions
        .revoke_all(ctx.principal.principal_type(), ctx.principal.id())
        .await;

    Ok(Json(RevokedResponse { revoked }))
}
