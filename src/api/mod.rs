// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, PrincipalSummary,
        RefreshRequest, RefreshResponse, ResetPasswordRequest, RevokedResponse, SessionItem,
        SessionListResponse, UpdateUserRequest, UserResponse, ValidateResetTokenRequest,
    },
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod sessions;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route(
            "/auth/validate-reset-token",
            post(auth::validate_reset_token),
        )
        .route("/users/me", get(users::me))
        .route(
            "/users/{user_id}",
            get(users::get_user).put(users::update_user),
        )
        .route("/sessions", get(sessions::list_sessions))
        .route("/sessions/{session_id}", delete(sessions::revoke_session))
        .route(
            "/sessions/revoke-others",
            post(sessions::revoke_other_sessions),
        )
        .route("/sessions/revoke-all", post(sessions::revoke_all_sessions))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::logout,
        auth::refresh,
        auth::forgot_password,
        auth::reset_password,
        auth::validate_reset_token,
        users::me,
        users::get_user,
        users::update_user,
        sessions::list_sessions,
        sessions::revoke_session,
        sessions::revoke_other_sessions,
        sessions::revoke_all_sessions,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            PrincipalSummary,
            RefreshRequest,
            RefreshResponse,
            MessageResponse,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            ValidateResetTokenRequest,
            SessionItem,
            SessionListResponse,
            RevokedResponse,
            UpdateUserRequest,
            UserResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout, token refresh and credential recovery"),
        (name = "Users", description = "User profiles"),
        (name = "Sessions", description = "Per-device session management"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;
