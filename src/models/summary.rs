// ABOUTME: Daily summary record aggregating one user's activity for one calendar day
// ABOUTME: Holds per-domain completion rates, pain/duration metrics, and an open metrics map
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::thresholds;

/// One aggregate record per (user, calendar day).
///
/// Created on the first log event of a user's day and fully recomputed on
/// every subsequent same-day event. Unique on `(user_id, date)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySummary {
    /// Storage key
    pub id: i64,
    /// Owning user
    pub user_id: Uuid,
    /// Calendar day this record aggregates
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
    /// Average post-activity pain score (1-10), None when no event reported pain
    pub avg_pain_score: Option<i32>,
    /// Total exercise duration in seconds
    pub total_duration_sec: i32,
    /// Open-ended metrics map (raw counts, average effort rating, ...)
    pub daily_metrics: serde_json::Value,
    /// When the record was first created
    pub created_at: DateTime<Utc>,
    /// When the record was last recomputed
    pub updated_at: DateTime<Utc>,
}

impl DailySummary {
    /// Whether this day's exercise completion meets the streak criterion
    #[must_use]
    pub const fn meets_exercise_criteria(&self) -> bool {
        self.exercise_completion_rate >= thresholds::STREAK_EXERCISE_MIN_RATE
    }

    /// Whether this day's medication completion meets the streak criterion
    #[must_use]
    pub const fn meets_medication_criteria(&self) -> bool {
        self.medication_completion_rate >= thresholds::STREAK_MEDICATION_MIN_RATE
    }

    /// Whether this day qualifies for the streak.
    ///
    /// Diet completion does not participate in the predicate.
    #[must_use]
    pub const fn meets_streak_criteria(&self) -> bool {
        self.meets_exercise_criteria() || self.meets_medication_criteria()
    }
}

/// Derived fields of a daily summary, ready to be persisted.
///
/// The storage key and audit timestamps are owned by the store: an upsert
/// preserves the existing row's `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDailySummary {
    /// Owning user
    pub user_id: Uuid,
    /// Calendar day this record aggregates
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
    /// Average post-activity pain score (1-10)
    pub avg_pain_score: Option<i32>,
    /// Total exercise duration in seconds
    pub total_duration_sec: i32,
    /// Open-ended metrics map
    pub daily_metrics: serde_json::Value,
}

/// Streak-qualification predicate over a day's completion rates.
///
/// Exercise is weighted more leniently than medication; the two are OR-ed.
#[must_use]
pub const fn qualifies_for_streak(exercise_rate: i32, medication_rate: i32) -> bool {
    exercise_rate >= thresholds::STREAK_EXERCISE_MIN_RATE
        || medication_rate >= thresholds::STREAK_MEDICATION_MIN_RATE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualification_thresholds_are_exact() {
        assert!(qualifies_for_streak(60, 0));
        assert!(!qualifies_for_streak(59, 0));
        assert!(qualifies_for_streak(0, 70));
        assert!(!qualifies_for_streak(0, 69));
        // OR semantics
        assert!(qualifies_for_streak(0, 70));
        assert!(qualifies_for_streak(60, 69));
        assert!(!qualifies_for_streak(59, 69));
    }
}
