// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User-resource endpoints.
//!
//! `/me` is self-service and only needs a live session. The id-addressed
//! routes run the full authorization pipeline: role permission first, then
//! ownership of the specific user record. Admins own everything; a gamenet
//! only reaches the users linked to it; a user only reaches itself.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    auth::{parse_resource_id, Auth, PrincipalType},
    error::ApiError,
    models::{PrincipalSummary, UpdateUserRequest, UserResponse},
    state::AppState,
};

/// The principal behind the presented token.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The authenticated principal", body = PrincipalSummary),
        (status = 401, description = "Invalid or expired token"),
    )
)]
pub async fn me(Auth(ctx): Auth) -> Json<PrincipalSummary> {
    Json(PrincipalSummary::from(&ctx.principal))
}

/// Fetch a user record by id.
#[utoipa::path(
    get,
    path = "/v1/users/{user_id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("user_id" = i64, Path, description = "User to fetch")),
    responses(
        (status = 200, description = "The user record", body = UserResponse),
        (status = 400, description = "Non-numeric user id"),
        (status = 403, description = "Permission or ownership denied"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = parse_resource_id(&user_id)?;

    state
        .permissions
        .authorize(&ctx.principal, "users", "view", Some(user_id))
        .await?;

    let store = state.store.read().await;
    let record = store
        .principal(PrincipalType::User, user_id)
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse {
        id: record.id,
        email: record.email.clone(),
        name: record.name.clone(),
        last_login_at: record.last_login_at,
    }))
}

/// Update a user's profile.
#[utoipa::path(
    put,
    path = "/v1/users/{user_id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("user_id" = i64, Path, description = "User to update")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user record", body = UserResponse),
        (status = 400, description = "Non-numeric user id"),
        (status = 403, description = "Permission or ownership denied"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user_id = parse_resource_id(&user_id)?;

    state
        .permissions
        .authorize(&ctx.principal, "users", "update", Some(user_id))
        .await?;

    let mut store = state.store.write().await;
    if store.principal(PrincipalType::User, user_id).is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    store.update_principal_name(PrincipalType::User, user_id, request.name)?;

    let record = store
        .principal(PrincipalType::User, user_id)
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserResponse {
        id: record.id,
        email: record.email.clone(),
        name: record.name.clone(),
        last_login_at: record.last_login_at,
    }))
}
