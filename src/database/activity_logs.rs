// ABOUTME: Activity log store lookups for exercise, medication, and diet events
// ABOUTME: Day-window queries feeding the completion aggregator, plus insert helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::summaries::parse_timestamp;
use crate::errors::{AppError, AppResult};
use crate::models::{DietLog, ExerciseLog, MedicationLog};

/// Activity log database operations manager
///
/// The aggregation core only ever reads one user's logs for one calendar
/// day; timestamps are stored as RFC 3339 text and day windows are matched
/// with `SQLite`'s `date()` on the stored value.
pub struct ActivityLogManager {
    pool: SqlitePool,
}

impl ActivityLogManager {
    /// Create a new activity log manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Day-window lookups
    // ========================================================================

    /// Exercise logs for one user on one calendar day
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn exercise_logs_on(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> AppResult<Vec<ExerciseLog>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, logged_at, completion_rate, pain_after, rpe,
                   duration_sec, notes
            FROM exercise_logs
            WHERE user_id = $1 AND date(logged_at) = $2
            ORDER BY logged_at ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(day.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get exercise logs: {e}")))?;

        rows.iter().map(Self::row_to_exercise_log).collect()
    }

    /// Medication logs for one user on one calendar day
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn medication_logs_on(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> AppResult<Vec<MedicationLog>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, taken_at, taken, notes
            FROM medication_logs
            WHERE user_id = $1 AND date(taken_at) = $2
            ORDER BY taken_at ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(day.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get medication logs: {e}")))?;

        rows.iter().map(Self::row_to_medication_log).collect()
    }

    /// Diet logs for one user on one calendar day
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn diet_logs_on(&self, user_id: Uuid, day: NaiveDate) -> AppResult<Vec<DietLog>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, logged_at, completed, portion_consumed, notes
            FROM diet_logs
            WHERE user_id = $1 AND date(logged_at) = $2
            ORDER BY logged_at ASC
            ",
        )
        .bind(user_id.to_string())
        .bind(day.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get diet logs: {e}")))?;

        rows.iter().map(Self::row_to_diet_log).collect()
    }

    // ========================================================================
    // Inserts (log-creation endpoints live outside the core; these back them
    // and the test fixtures)
    // ========================================================================

    /// Insert an exercise log
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn insert_exercise_log(
        &self,
        user_id: Uuid,
        logged_at: DateTime<Utc>,
        completion_rate: Option<i32>,
        pain_after: Option<i32>,
        rpe: Option<i32>,
        duration_sec: Option<i32>,
    ) -> AppResult<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO exercise_logs
                (user_id, logged_at, completion_rate, pain_after, rpe, duration_sec)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(user_id.to_string())
        .bind(logged_at.to_rfc3339())
        .bind(completion_rate)
        .bind(pain_after)
        .bind(rpe)
        .bind(duration_sec)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert exercise log: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a medication log
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn insert_medication_log(
        &self,
        user_id: Uuid,
        taken_at: DateTime<Utc>,
        taken: bool,
    ) -> AppResult<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO medication_logs (user_id, taken_at, taken)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(user_id.to_string())
        .bind(taken_at.to_rfc3339())
        .bind(taken)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert medication log: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a diet log
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn insert_diet_log(
        &self,
        user_id: Uuid,
        logged_at: DateTime<Utc>,
        completed: bool,
        portion_consumed: Option<i32>,
    ) -> AppResult<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO diet_logs (user_id, logged_at, completed, portion_consumed)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(user_id.to_string())
        .bind(logged_at.to_rfc3339())
        .bind(completed)
        .bind(portion_consumed)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert diet log: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    // ========================================================================
    // Row converters
    // ========================================================================

    fn row_to_exercise_log(row: &SqliteRow) -> AppResult<ExerciseLog> {
        let user_id: String = row.get("user_id");
        let logged_at: String = row.get("logged_at");
        Ok(ExerciseLog {
            id: row.get("id"),
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::database(format!("Invalid user id in log row: {e}")))?,
            logged_at: parse_timestamp(&logged_at)?,
            completion_rate: row.get("completion_rate"),
            pain_after: row.get("pain_after"),
            rpe: row.get("rpe"),
            duration_sec: row.get("duration_sec"),
            notes: row.get("notes"),
        })
    }

    fn row_to_medication_log(row: &SqliteRow) -> AppResult<MedicationLog> {
        let user_id: String = row.get("user_id");
        let taken_at: String = row.get("taken_at");
        Ok(MedicationLog {
            id: row.get("id"),
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::database(format!("Invalid user id in log row: {e}")))?,
            taken_at: parse_timestamp(&taken_at)?,
            taken: row.get("taken"),
            notes: row.get("notes"),
        })
    }

    fn row_to_diet_log(row: &SqliteRow) -> AppResult<DietLog> {
        let user_id: String = row.get("user_id");
        let logged_at: String = row.get("logged_at");
        Ok(DietLog {
            id: row.get("id"),
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::database(format!("Invalid user id in log row: {e}")))?,
            logged_at: parse_timestamp(&logged_at)?,
            completed: row.get("completed"),
            portion_consumed: row.get("portion_consumed"),
            notes: row.get("notes"),
        })
    }
}
