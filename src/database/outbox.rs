// ABOUTME: Persistent outbox for streak updates that failed after a summary write
// ABOUTME: Gives the fire-and-forget side effect at-least-once delivery with bounded retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::constants::limits;
use crate::errors::{AppError, AppResult};

/// A streak update awaiting redelivery
#[derive(Debug, Clone)]
pub struct PendingStreakUpdate {
    /// Storage key
    pub id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// Calendar day the update applies to
    pub date: NaiveDate,
    /// Exercise completion rate computed for that day
    pub exercise_completion_rate: i32,
    /// Medication completion rate computed for that day
    pub medication_completion_rate: i32,
    /// Delivery attempts so far
    pub attempts: i32,
    /// Message from the most recent failure
    pub last_error: Option<String>,
}

/// Streak update outbox operations manager
pub struct OutboxManager {
    pool: SqlitePool,
}

impl OutboxManager {
    /// Create a new outbox manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a streak update that could not be applied inline
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn enqueue(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        exercise_completion_rate: i32,
        medication_completion_rate: i32,
        error: &str,
    ) -> AppResult<i64> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            r"
            INSERT INTO streak_update_outbox
                (user_id, date, exercise_completion_rate, medication_completion_rate,
                 attempts, last_error, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 0, $5, $6, $6)
            ",
        )
        .bind(user_id.to_string())
        .bind(date.to_string())
        .bind(exercise_completion_rate)
        .bind(medication_completion_rate)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to enqueue streak update: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    /// Pending updates still eligible for retry, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn pending(&self, limit: i64) -> AppResult<Vec<PendingStreakUpdate>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, date, exercise_completion_rate,
                   medication_completion_rate, attempts, last_error
            FROM streak_update_outbox
            WHERE attempts < $1
            ORDER BY created_at ASC
            LIMIT $2
            ",
        )
        .bind(limits::OUTBOX_MAX_ATTEMPTS)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to read streak outbox: {e}")))?;

        rows.iter().map(Self::row_to_pending).collect()
    }

    /// Remove a delivered update
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM streak_update_outbox WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete outbox entry: {e}")))?;
        Ok(())
    }

    /// Record another failed delivery attempt
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn record_failure(&self, id: i64, error: &str) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE streak_update_outbox
            SET attempts = attempts + 1, last_error = $1, updated_at = $2
            WHERE id = $3
            ",
        )
        .bind(error)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record outbox failure: {e}")))?;
        Ok(())
    }

    fn row_to_pending(row: &SqliteRow) -> AppResult<PendingStreakUpdate> {
        let user_id: String = row.get("user_id");
        let date: String = row.get("date");
        Ok(PendingStreakUpdate {
            id: row.get("id"),
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::database(format!("Invalid user id in outbox row: {e}")))?,
            date: date
                .parse()
                .map_err(|e| AppError::database(format!("Invalid date in outbox row: {e}")))?,
            exercise_completion_rate: row.get("exercise_completion_rate"),
            medication_completion_rate: row.get("medication_completion_rate"),
            attempts: row.get("attempts"),
            last_error: row.get("last_error"),
        })
    }
}
