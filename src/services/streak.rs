// ABOUTME: Streak service - qualification, history reconstruction, stale sweep, outbox drain
// ABOUTME: Serializes all streak writes per user so day ordering cannot be corrupted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! Streak service
//!
//! All mutations of a user's streak record flow through
//! [`StreakService::update_from_daily_summary`] (and the sweep, which reuses
//! the same path), behind a per-user async mutex. Day-boundary semantics
//! live in [`crate::models::UserStreak`]; this layer adds qualification,
//! persistence, and the read-side reconstruction of activity history.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::constants::limits;
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{
    qualifies_for_streak, ActivityHistoryEntry, StreakTransition, UserStreak,
};

/// A streak snapshot together with reconstructed activity history
#[derive(Debug, Clone)]
pub struct StreakOverview {
    /// The user's streak record (a fresh zero record when none is stored)
    pub streak: UserStreak,
    /// One entry per day, oldest first
    pub activity_history: Vec<ActivityHistoryEntry>,
}

/// Streak service
pub struct StreakService {
    database: Database,
    // One mutex per user; writes to the shared streak record must apply in
    // non-decreasing day order.
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl StreakService {
    /// Create the service
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self {
            database,
            locks: DashMap::new(),
        }
    }

    fn user_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Apply one day's completion rates to the user's streak.
    ///
    /// The day qualifies when the exercise or medication rate meets its
    /// threshold. Re-applying the same day is a no-op; a day older than the
    /// record's cursor is ignored with a logged anomaly.
    ///
    /// # Errors
    ///
    /// Returns an error if the database update fails
    pub async fn update_from_daily_summary(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        exercise_completion_rate: i32,
        medication_completion_rate: i32,
    ) -> AppResult<UserStreak> {
        let qualifies =
            qualifies_for_streak(exercise_completion_rate, medication_completion_rate);

        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let (streak, transition) = self
            .database
            .streaks()
            .advance_or_reset(user_id, date, qualifies)
            .await?;

        match transition {
            StreakTransition::Extended | StreakTransition::Restarted => {
                info!(%user_id, %date, streak = streak.current_streak, "Streak updated");
            }
            StreakTransition::Cleared => {
                info!(%user_id, %date, "Streak reset (criteria not met)");
            }
            StreakTransition::Unchanged => {
                if date < streak.last_active_date {
                    warn!(
                        %user_id, %date,
                        last_active = %streak.last_active_date,
                        "Ignoring out-of-order streak update"
                    );
                }
            }
        }

        Ok(streak)
    }

    /// Streak snapshot with `range_days` of reconstructed history.
    ///
    /// A user without a stored record gets a fresh zero snapshot; the read
    /// path does not persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database queries fail
    pub async fn get_streak(&self, user_id: Uuid, range_days: u32) -> AppResult<StreakOverview> {
        let today = Utc::now().date_naive();
        let streak = self
            .database
            .streaks()
            .get(user_id)
            .await?
            .unwrap_or_else(|| UserStreak::initial(user_id, today));

        let activity_history = self.activity_history(user_id, range_days).await?;

        Ok(StreakOverview {
            streak,
            activity_history,
        })
    }

    /// Streak snapshot without history (home screen)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_streak_simple(&self, user_id: Uuid) -> AppResult<UserStreak> {
        let today = Utc::now().date_naive();
        Ok(self
            .database
            .streaks()
            .get(user_id)
            .await?
            .unwrap_or_else(|| UserStreak::initial(user_id, today)))
    }

    /// Reconstruct exactly `days` entries spanning `[today - days + 1, today]`.
    ///
    /// Days with a summary record derive `is_active` from the qualification
    /// predicate; days without one are synthesized as inactive with zero
    /// rates. Purely read-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn activity_history(
        &self,
        user_id: Uuid,
        days: u32,
    ) -> AppResult<Vec<ActivityHistoryEntry>> {
        let today = Utc::now().date_naive();
        let start = today
            .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
            .unwrap_or(today);

        let summaries = self.database.summaries().between(user_id, start, today).await?;
        let by_date: std::collections::HashMap<NaiveDate, _> =
            summaries.into_iter().map(|s| (s.date, s)).collect();

        let mut history = Vec::with_capacity(days as usize);
        let mut current = start;
        while current <= today {
            let entry = by_date.get(&current).map_or_else(
                || ActivityHistoryEntry::empty(current),
                |summary| ActivityHistoryEntry {
                    date: current,
                    is_active: summary.meets_streak_criteria(),
                    exercise_completion_rate: summary.exercise_completion_rate,
                    medication_completion_rate: summary.medication_completion_rate,
                },
            );
            history.push(entry);
            let Some(next) = current.checked_add_days(Days::new(1)) else {
                break;
            };
            current = next;
        }

        Ok(history)
    }

    /// Reset streaks for users who stopped logging entirely.
    ///
    /// Selects records with `last_active_date < today` and a positive
    /// streak, then hard-resets those strictly more than one day behind.
    /// One record failing does not abort the sweep. Returns the reset count.
    ///
    /// # Errors
    ///
    /// Returns an error only if the candidate scan itself fails
    pub async fn cleanup_stale_streaks(&self) -> AppResult<u32> {
        let today = Utc::now().date_naive();
        let stale = self.database.streaks().find_stale(today).await?;

        let cutoff = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        let mut reset_count = 0u32;
        for record in stale {
            if record.last_active_date >= cutoff {
                continue;
            }

            let lock = self.user_lock(record.user_id);
            let _guard = lock.lock().await;
            match self
                .database
                .streaks()
                .advance_or_reset(record.user_id, today, false)
                .await
            {
                Ok(_) => reset_count += 1,
                Err(e) => {
                    error!(user_id = %record.user_id, error = %e, "Failed to reset stale streak");
                }
            }
        }

        info!(reset_count, "Cleaned up stale streaks");
        Ok(reset_count)
    }

    /// Number of users with a positive current streak (observability)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn count_active_streaks(&self) -> AppResult<i64> {
        self.database.streaks().count_active().await
    }

    /// Leaderboard: top records by all-time maximum, then current streak
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn top_streaks(&self, limit: i64) -> AppResult<Vec<UserStreak>> {
        self.database.streaks().top_streaks(limit).await
    }

    /// Retry streak updates that failed after their summary write.
    ///
    /// Delivered entries are removed; failing entries get their attempt
    /// count bumped and stay queued until the attempt cap. Returns the
    /// number delivered.
    ///
    /// # Errors
    ///
    /// Returns an error only if the pending scan itself fails
    pub async fn drain_outbox(&self) -> AppResult<u32> {
        let pending = self
            .database
            .outbox()
            .pending(limits::OUTBOX_DRAIN_BATCH)
            .await?;

        let outbox = self.database.outbox();
        let mut delivered = 0u32;
        for entry in pending {
            let applied = self
                .update_from_daily_summary(
                    entry.user_id,
                    entry.date,
                    entry.exercise_completion_rate,
                    entry.medication_completion_rate,
                )
                .await;

            match applied {
                Ok(_) => {
                    if let Err(e) = outbox.delete(entry.id).await {
                        error!(entry = entry.id, error = %e, "Failed to remove delivered outbox entry");
                    } else {
                        delivered += 1;
                    }
                }
                Err(e) => {
                    warn!(entry = entry.id, attempts = entry.attempts + 1, error = %e, "Streak outbox retry failed");
                    if let Err(record_err) = outbox.record_failure(entry.id, &e.to_string()).await {
                        error!(entry = entry.id, error = %record_err, "Failed to record outbox failure");
                    }
                }
            }
        }

        if delivered > 0 {
            info!(delivered, "Drained streak update outbox");
        }
        Ok(delivered)
    }
}
