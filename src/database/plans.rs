// ABOUTME: Rehabilitation plan lookups consumed by the completion aggregator
// ABOUTME: Active-plan resolution and per-domain prescribed item counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use super::summaries::parse_timestamp;
use crate::errors::{AppError, AppResult};
use crate::models::{PlanDomain, PlanStatus, RehabPlan};

/// Plan database operations manager
///
/// Plan CRUD lives outside the core; the aggregator only needs the active
/// plan and its prescribed-item counts per domain.
pub struct PlanManager {
    pool: SqlitePool,
}

impl PlanManager {
    /// Create a new plan manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// The user's currently active plan: most recently created with status
    /// `active`, or None
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn active_plan(&self, user_id: Uuid) -> AppResult<Option<RehabPlan>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, title, status, created_at
            FROM rehab_plans
            WHERE user_id = $1 AND status = 'active'
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get active plan: {e}")))?;

        row.map(|r| Self::row_to_plan(&r)).transpose()
    }

    /// Number of prescribed items of one domain on a plan
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_items(&self, plan_id: i64, domain: PlanDomain) -> AppResult<i64> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) AS total FROM plan_items
            WHERE plan_id = $1 AND domain = $2
            ",
        )
        .bind(plan_id)
        .bind(domain.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count plan items: {e}")))?;

        Ok(row.get("total"))
    }

    /// Create a plan (used by seeding and tests; plan CRUD endpoints live
    /// outside the core)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn create_plan(
        &self,
        user_id: Uuid,
        title: &str,
        status: PlanStatus,
        created_at: DateTime<Utc>,
    ) -> AppResult<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO rehab_plans (user_id, title, status, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(user_id.to_string())
        .bind(title)
        .bind(status.as_str())
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create plan: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    /// Add a prescribed item to a plan
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn add_item(&self, plan_id: i64, domain: PlanDomain, name: &str) -> AppResult<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO plan_items (plan_id, domain, name)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(plan_id)
        .bind(domain.as_str())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to add plan item: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    fn row_to_plan(row: &SqliteRow) -> AppResult<RehabPlan> {
        let user_id: String = row.get("user_id");
        let status: String = row.get("status");
        let created_at: String = row.get("created_at");
        Ok(RehabPlan {
            id: row.get("id"),
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::database(format!("Invalid user id in plan row: {e}")))?,
            title: row.get("title"),
            status: PlanStatus::from_str(&status)?,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}
