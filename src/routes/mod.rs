// ABOUTME: Route module organization for rehab-tracker HTTP endpoints
// ABOUTME: Thin handlers per domain delegating to the service layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! Route modules
//!
//! Each domain module contains only route definitions and thin handler
//! functions that delegate to the service layer. Authentication is an
//! external collaborator: handlers read the caller's identity from the
//! `X-User-Id` header set by the (out-of-scope) auth middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::context::ServerResources;
use crate::errors::AppError;

/// Upper bound on request handling; the core operates on a single user and
/// day, so anything slower indicates a stuck store
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Health check and readiness routes
pub mod health;
/// Streak and activity history routes
pub mod streak;
/// Daily summary routes
pub mod summary;

pub use health::HealthRoutes;
pub use streak::StreakRoutes;
pub use summary::SummaryRoutes;

/// Assemble the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(SummaryRoutes::routes(Arc::clone(&resources)))
        .merge(StreakRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CorsLayer::permissive())
}

/// Extract the authenticated user id placed in `X-User-Id` by the upstream
/// auth layer
pub(crate) fn require_user_id(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let value = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(AppError::auth_required)?;

    Uuid::parse_str(value)
        .map_err(|_| AppError::auth_invalid(format!("Invalid user id: {value}")))
}
