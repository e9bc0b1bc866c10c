// ABOUTME: User streak database operations with an atomic read-modify-write contract
// ABOUTME: Advance/reset transitions, stale scans, active counts, and the leaderboard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::summaries::parse_timestamp;
use crate::errors::{AppError, AppResult};
use crate::models::{StreakTransition, UserStreak};

/// User streak database operations manager
///
/// The only mutation is [`StreakManager::advance_or_reset`]: a single
/// read-modify-write inside a transaction, so callers never juggle separate
/// read/mutate/save steps on the shared per-user record.
pub struct StreakManager {
    pool: SqlitePool,
}

impl StreakManager {
    /// Create a new streak manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the streak record for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, user_id: Uuid) -> AppResult<Option<UserStreak>> {
        let row = sqlx::query(
            r"
            SELECT user_id, current_streak, max_streak, last_active_date,
                   created_at, updated_at
            FROM user_streaks
            WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user streak: {e}")))?;

        row.map(|r| Self::row_to_user_streak(&r)).transpose()
    }

    /// Apply one day's qualification outcome to the user's streak record.
    ///
    /// Creates the record lazily (0/0/`day`) when absent, applies
    /// [`UserStreak::advance`] or [`UserStreak::reset`] depending on
    /// `qualifies`, and persists the result, all inside one transaction.
    /// Returns the stored state together with the transition that happened.
    ///
    /// # Errors
    ///
    /// Returns an error if the database transaction fails
    pub async fn advance_or_reset(
        &self,
        user_id: Uuid,
        day: NaiveDate,
        qualifies: bool,
    ) -> AppResult<(UserStreak, StreakTransition)> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin streak transaction: {e}")))?;

        let row = sqlx::query(
            r"
            SELECT user_id, current_streak, max_streak, last_active_date,
                   created_at, updated_at
            FROM user_streaks
            WHERE user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to read user streak: {e}")))?;

        let mut streak = match row {
            Some(r) => Self::row_to_user_streak(&r)?,
            None => {
                let initial = UserStreak::initial(user_id, day);
                sqlx::query(
                    r"
                    INSERT INTO user_streaks
                        (user_id, current_streak, max_streak, last_active_date,
                         created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    ",
                )
                .bind(initial.user_id.to_string())
                .bind(initial.current_streak)
                .bind(initial.max_streak)
                .bind(initial.last_active_date.to_string())
                .bind(initial.created_at.to_rfc3339())
                .bind(initial.updated_at.to_rfc3339())
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::database(format!("Failed to create user streak: {e}")))?;
                initial
            }
        };

        let transition = if qualifies {
            streak.advance(day)
        } else {
            streak.reset(day)
        };

        if transition != StreakTransition::Unchanged {
            streak.updated_at = Utc::now();
            sqlx::query(
                r"
                UPDATE user_streaks
                SET current_streak = $1, max_streak = $2, last_active_date = $3,
                    updated_at = $4
                WHERE user_id = $5
                ",
            )
            .bind(streak.current_streak)
            .bind(streak.max_streak)
            .bind(streak.last_active_date.to_string())
            .bind(streak.updated_at.to_rfc3339())
            .bind(streak.user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to update user streak: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit streak transaction: {e}")))?;

        Ok((streak, transition))
    }

    /// Streak records whose last activity predates `today` while the streak
    /// is still positive: candidates for the stale sweep
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn find_stale(&self, today: NaiveDate) -> AppResult<Vec<UserStreak>> {
        let rows = sqlx::query(
            r"
            SELECT user_id, current_streak, max_streak, last_active_date,
                   created_at, updated_at
            FROM user_streaks
            WHERE last_active_date < $1 AND current_streak > 0
            ",
        )
        .bind(today.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to scan stale streaks: {e}")))?;

        rows.iter().map(Self::row_to_user_streak).collect()
    }

    /// Number of users whose current streak is positive
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_active(&self) -> AppResult<i64> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) AS active FROM user_streaks WHERE current_streak > 0
            ",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count active streaks: {e}")))?;

        Ok(row.get("active"))
    }

    /// Top streak records ordered by all-time maximum, then current streak
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn top_streaks(&self, limit: i64) -> AppResult<Vec<UserStreak>> {
        let rows = sqlx::query(
            r"
            SELECT user_id, current_streak, max_streak, last_active_date,
                   created_at, updated_at
            FROM user_streaks
            ORDER BY max_streak DESC, current_streak DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get top streaks: {e}")))?;

        rows.iter().map(Self::row_to_user_streak).collect()
    }

    fn row_to_user_streak(row: &SqliteRow) -> AppResult<UserStreak> {
        let user_id: String = row.get("user_id");
        let last_active: String = row.get("last_active_date");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(UserStreak {
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| AppError::database(format!("Invalid user id in streak row: {e}")))?,
            current_streak: row.get("current_streak"),
            max_streak: row.get("max_streak"),
            last_active_date: last_active.parse().map_err(|e| {
                AppError::database(format!("Invalid last active date in streak row: {e}"))
            })?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}
