// ABOUTME: Route handlers for daily summary reads and recomputation triggers
// ABOUTME: GET the stored aggregate for a day, POST to re-aggregate from raw logs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! Daily summary routes

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::context::ServerResources;
use crate::errors::AppError;
use crate::models::DailySummary;
use crate::routes::require_user_id;

// ============================================================================
// Request / Response Types
// ============================================================================

/// Query parameters for the daily summary lookup
#[derive(Debug, Deserialize)]
pub struct DailySummaryQuery {
    /// Calendar day, `YYYY-MM-DD`
    pub date: NaiveDate,
}

/// Body for the recompute trigger
#[derive(Debug, Deserialize)]
pub struct RecomputeRequest {
    /// Timestamp whose calendar day should be re-aggregated
    pub timestamp: DateTime<Utc>,
}

/// Response for a daily summary
#[derive(Debug, Serialize, Deserialize)]
pub struct DailySummaryResponse {
    /// Storage key
    pub summary_id: i64,
    /// Owning user
    pub user_id: String,
    /// Calendar day
    pub date: NaiveDate,
    /// Whether every prescribed exercise item was completed
    pub all_exercises_completed: bool,
    /// Exercise completion rate, 0-100
    pub exercise_completion_rate: i32,
    /// Whether every prescribed medication item was taken
    pub all_medications_taken: bool,
    /// Medication completion rate, 0-100
    pub medication_completion_rate: i32,
    /// Whether every prescribed diet item was completed
    pub all_diet_completed: bool,
    /// Diet completion rate, 0-100
    pub diet_completion_rate: i32,
    /// Average post-activity pain score
    pub avg_pain_score: Option<i32>,
    /// Total exercise duration in seconds
    pub total_duration_sec: i32,
    /// Open-ended metrics map
    pub daily_metrics: serde_json::Value,
    /// When the record was created
    pub created_at: String,
    /// When the record was last recomputed
    pub updated_at: String,
}

impl From<DailySummary> for DailySummaryResponse {
    fn from(summary: DailySummary) -> Self {
        Self {
            summary_id: summary.id,
            user_id: summary.user_id.to_string(),
            date: summary.date,
            all_exercises_completed: summary.all_exercises_completed,
            exercise_completion_rate: summary.exercise_completion_rate,
            all_medications_taken: summary.all_medications_taken,
            medication_completion_rate: summary.medication_completion_rate,
            all_diet_completed: summary.all_diet_completed,
            diet_completion_rate: summary.diet_completion_rate,
            avg_pain_score: summary.avg_pain_score,
            total_duration_sec: summary.total_duration_sec,
            daily_metrics: summary.daily_metrics,
            created_at: summary.created_at.to_rfc3339(),
            updated_at: summary.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Daily summary routes handler
pub struct SummaryRoutes;

impl SummaryRoutes {
    /// Create all summary routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/summary/daily", get(Self::handle_get_daily))
            .route("/api/v1/summary/recompute", post(Self::handle_recompute))
            .with_state(resources)
    }

    /// Handle GET /api/v1/summary/daily - stored aggregate for one day
    async fn handle_get_daily(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<DailySummaryQuery>,
    ) -> Result<Response, AppError> {
        let user_id = require_user_id(&headers)?;

        let summary = resources
            .summary_service
            .get_daily_summary(user_id, query.date)
            .await?;

        let response: DailySummaryResponse = summary.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/v1/summary/recompute - re-aggregate the day that
    /// contains the given timestamp.
    ///
    /// The streak side effect is fire-and-forget; the response only reflects
    /// the summary write.
    async fn handle_recompute(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<RecomputeRequest>,
    ) -> Result<Response, AppError> {
        let user_id = require_user_id(&headers)?;

        resources
            .summary_service
            .recompute_daily_summary(user_id, body.timestamp)
            .await?;

        Ok((
            StatusCode::ACCEPTED,
            Json(serde_json::json!({
                "status": "accepted",
                "date": body.timestamp.date_naive(),
            })),
        )
            .into_response())
    }
}
