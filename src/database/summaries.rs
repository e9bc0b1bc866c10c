// ABOUTME: Daily summary database operations keyed by (user, calendar day)
// ABOUTME: Atomic upsert of derived fields plus point and range lookups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{DailySummary, NewDailySummary};

/// Daily summary database operations manager
///
/// Wraps a `SqlitePool` to provide summary persistence. The upsert is a
/// single `INSERT .. ON CONFLICT DO UPDATE` statement so no partial field
/// state is ever observable.
pub struct SummaryManager {
    pool: SqlitePool,
}

impl SummaryManager {
    /// Create a new summary manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert the summary for `(summary.user_id, summary.date)`.
    ///
    /// An existing row keeps its storage key and `created_at`; all derived
    /// fields are overwritten. Re-running with identical inputs produces an
    /// identical stored record apart from `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn upsert(&self, summary: &NewDailySummary) -> AppResult<DailySummary> {
        let metrics_json = serde_json::to_string(&summary.daily_metrics)
            .map_err(|e| AppError::serialization(format!("Failed to encode daily metrics: {e}")))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO daily_summaries (
                user_id, date,
                all_exercises_completed, exercise_completion_rate,
                all_medications_taken, medication_completion_rate,
                all_diet_completed, diet_completion_rate,
                avg_pain_score, total_duration_sec, daily_metrics,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            ON CONFLICT(user_id, date) DO UPDATE SET
                all_exercises_completed = excluded.all_exercises_completed,
                exercise_completion_rate = excluded.exercise_completion_rate,
                all_medications_taken = excluded.all_medications_taken,
                medication_completion_rate = excluded.medication_completion_rate,
                all_diet_completed = excluded.all_diet_completed,
                diet_completion_rate = excluded.diet_completion_rate,
                avg_pain_score = excluded.avg_pain_score,
                total_duration_sec = excluded.total_duration_sec,
                daily_metrics = excluded.daily_metrics,
                updated_at = excluded.updated_at
            ",
        )
        .bind(summary.user_id.to_string())
        .bind(summary.date.to_string())
        .bind(summary.all_exercises_completed)
        .bind(summary.exercise_completion_rate)
        .bind(summary.all_medications_taken)
        .bind(summary.medication_completion_rate)
        .bind(summary.all_diet_completed)
        .bind(summary.diet_completion_rate)
        .bind(summary.avg_pain_score)
        .bind(summary.total_duration_sec)
        .bind(metrics_json)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to upsert daily summary: {e}")))?;

        self.get(summary.user_id, summary.date).await?.ok_or_else(|| {
            AppError::database("Daily summary missing immediately after upsert")
        })
    }

    /// Get the summary for one user and day
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Option<DailySummary>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, date,
                   all_exercises_completed, exercise_completion_rate,
                   all_medications_taken, medication_completion_rate,
                   all_diet_completed, diet_completion_rate,
                   avg_pain_score, total_duration_sec, daily_metrics,
                   created_at, updated_at
            FROM daily_summaries
            WHERE user_id = $1 AND date = $2
            ",
        )
        .bind(user_id.to_string())
        .bind(date.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get daily summary: {e}")))?;

        row.map(|r| Self::row_to_daily_summary(&r)).transpose()
    }

    /// Get all summaries for a user within `[start, end]`, ascending by day
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DailySummary>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, date,
                   all_exercises_completed, exercise_completion_rate,
                   all_medications_taken, medication_completion_rate,
                   all_diet_completed, diet_completion_rate,
                   avg_pain_score, total_duration_sec, daily_metrics,
                   created_at, updated_at
            FROM daily_summaries
            WHERE user_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(start.to_string())
        .bind(end.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get daily summaries: {e}")))?;

        rows.iter().map(Self::row_to_daily_summary).collect()
    }

    fn row_to_daily_summary(row: &SqliteRow) -> AppResult<DailySummary> {
        let user_id: String = row.get("user_id");
        let date: String = row.get("date");
        let metrics: String = row.get("daily_metrics");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(DailySummary {
            id: row.get("id"),
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::database(format!("Invalid user id in summary row: {e}")))?,
            date: date
                .parse()
                .map_err(|e| AppError::database(format!("Invalid date in summary row: {e}")))?,
            all_exercises_completed: row.get("all_exercises_completed"),
            exercise_completion_rate: row.get("exercise_completion_rate"),
            all_medications_taken: row.get("all_medications_taken"),
            medication_completion_rate: row.get("medication_completion_rate"),
            all_diet_completed: row.get("all_diet_completed"),
            diet_completion_rate: row.get("diet_completion_rate"),
            avg_pain_score: row.get("avg_pain_score"),
            total_duration_sec: row.get("total_duration_sec"),
            daily_metrics: serde_json::from_str(&metrics).map_err(|e| {
                AppError::database(format!("Invalid metrics JSON in summary row: {e}"))
            })?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

pub(crate) fn parse_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid timestamp '{value}': {e}")))
}
