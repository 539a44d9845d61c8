// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gamenet Auth - Authentication & Authorization Service
//!
//! This crate authenticates gaming-center platform principals (end-users,
//! administrators and gaming-center operators), issues signed bearer tokens,
//! tracks per-device sessions for revocation, and enforces role-based access
//! control with resource-ownership checks.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, credentials, login/refresh/recovery service
//! - `session` - Per-device session registry with soft revocation
//! - `rbac` - Roles, permissions and the authorization engine

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod rbac;
pub mod session;
pub mod state;
pub mod store;
