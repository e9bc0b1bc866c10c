// ABOUTME: Route handlers for streak reads - snapshot, activity history, leaderboard
// ABOUTME: Clamps the requested history range and maps records to response DTOs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! Streak routes

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::{defaults, limits};
use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::{ActivityHistoryEntry, UserStreak};
use crate::routes::require_user_id;

// ============================================================================
// Request / Response Types
// ============================================================================

/// Query parameters for the streak lookup
#[derive(Debug, Deserialize, Default)]
pub struct StreakQuery {
    /// Number of history days to include, clamped to [1, 90]; default 30
    pub range: Option<u32>,
}

/// Query parameters for the leaderboard
#[derive(Debug, Deserialize, Default)]
pub struct LeaderboardQuery {
    /// Maximum entries to return
    pub limit: Option<i64>,
}

/// One day of activity history in a response
#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityHistoryEntryResponse {
    /// Calendar day
    pub date: NaiveDate,
    /// Whether the day met the qualification predicate
    pub is_active: bool,
    /// Exercise completion rate, 0-100
    pub exercise_completion_rate: i32,
    /// Medication completion rate, 0-100
    pub medication_completion_rate: i32,
}

impl From<ActivityHistoryEntry> for ActivityHistoryEntryResponse {
    fn from(entry: ActivityHistoryEntry) -> Self {
        Self {
            date: entry.date,
            is_active: entry.is_active,
            exercise_completion_rate: entry.exercise_completion_rate,
            medication_completion_rate: entry.medication_completion_rate,
        }
    }
}

/// Response for the streak lookup
#[derive(Debug, Serialize, Deserialize)]
pub struct StreakResponse {
    /// Consecutive qualifying days ending at the last active date
    pub current_streak: i32,
    /// All-time best streak
    pub max_streak: i32,
    /// Day of the most recent qualifying activity
    pub last_active_date: NaiveDate,
    /// One entry per requested day, oldest first
    pub activity_history: Vec<ActivityHistoryEntryResponse>,
}

/// Response for the home-screen streak lookup (no history)
#[derive(Debug, Serialize, Deserialize)]
pub struct StreakSimpleResponse {
    /// Consecutive qualifying days ending at the last active date
    pub current_streak: i32,
    /// All-time best streak
    pub max_streak: i32,
    /// Day of the most recent qualifying activity
    pub last_active_date: NaiveDate,
    /// Whether today has already been credited
    pub active_today: bool,
}

/// One leaderboard row
#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// User this row belongs to
    pub user_id: String,
    /// Current streak
    pub current_streak: i32,
    /// All-time best streak
    pub max_streak: i32,
}

impl From<UserStreak> for LeaderboardEntry {
    fn from(streak: UserStreak) -> Self {
        Self {
            user_id: streak.user_id.to_string(),
            current_streak: streak.current_streak,
            max_streak: streak.max_streak,
        }
    }
}

/// Response for the leaderboard
#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    /// Rows ordered by all-time best, then current streak
    pub entries: Vec<LeaderboardEntry>,
}

// ============================================================================
// Routes
// ============================================================================

/// Streak routes handler
pub struct StreakRoutes;

impl StreakRoutes {
    /// Create all streak routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/streak", get(Self::handle_get_streak))
            .route("/api/v1/streak/simple", get(Self::handle_get_streak_simple))
            .route("/api/v1/streak/leaderboard", get(Self::handle_leaderboard))
            .with_state(resources)
    }

    /// Handle GET /api/v1/streak - snapshot plus reconstructed history
    async fn handle_get_streak(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<StreakQuery>,
    ) -> Result<Response, AppError> {
        let user_id = require_user_id(&headers)?;

        let range_days = query
            .range
            .unwrap_or(defaults::HISTORY_RANGE_DAYS)
            .clamp(limits::HISTORY_RANGE_MIN, limits::HISTORY_RANGE_MAX);

        let overview = resources
            .streak_service
            .get_streak(user_id, range_days)
            .await?;

        let response = StreakResponse {
            current_streak: overview.streak.current_streak,
            max_streak: overview.streak.max_streak,
            last_active_date: overview.streak.last_active_date,
            activity_history: overview
                .activity_history
                .into_iter()
                .map(Into::into)
                .collect(),
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/v1/streak/simple - snapshot only, for the home screen
    async fn handle_get_streak_simple(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user_id = require_user_id(&headers)?;

        let streak = resources.streak_service.get_streak_simple(user_id).await?;
        let today = chrono::Utc::now().date_naive();

        let response = StreakSimpleResponse {
            current_streak: streak.current_streak,
            max_streak: streak.max_streak,
            last_active_date: streak.last_active_date,
            active_today: streak.is_active_today(today),
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/v1/streak/leaderboard - top streaks across users
    async fn handle_leaderboard(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<LeaderboardQuery>,
    ) -> Result<Response, AppError> {
        let limit = query.limit.unwrap_or(10).clamp(1, 100);

        let entries = resources.streak_service.top_streaks(limit).await?;

        let response = LeaderboardResponse {
            entries: entries.into_iter().map(Into::into).collect(),
        };

        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
