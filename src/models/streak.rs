// ABOUTME: Per-user streak record and the day-boundary state machine transitions
// ABOUTME: Tracks current/max consecutive qualifying days and the last active date
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exactly one row per user: the streak snapshot shown on the home screen.
///
/// The state machine is fully captured by `(current_streak, last_active_date)`;
/// transitions are [`UserStreak::advance`] and [`UserStreak::reset`], applied
/// once per (user, day) qualification evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStreak {
    /// Owning user (primary key)
    pub user_id: Uuid,
    /// Consecutive qualifying days ending at `last_active_date`
    pub current_streak: i32,
    /// All-time high of `current_streak`
    pub max_streak: i32,
    /// Calendar day of the most recent qualifying activity
    pub last_active_date: NaiveDate,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

/// Outcome of applying a day to the streak state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakTransition {
    /// Consecutive day: the streak grew by one
    Extended,
    /// Gap of two or more days: a new streak started at one
    Restarted,
    /// Day did not qualify: the streak dropped to zero
    Cleared,
    /// Same day re-evaluated, or an out-of-order older day: nothing changed
    Unchanged,
}

impl UserStreak {
    /// Fresh record for a user with no streak history
    #[must_use]
    pub fn initial(user_id: Uuid, today: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            current_streak: 0,
            max_streak: 0,
            last_active_date: today,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a qualifying day.
    ///
    /// - day immediately after `last_active_date`: streak grows by one
    /// - gap of two or more days: streak restarts at one
    /// - same day re-evaluated: counters unchanged (idempotent)
    /// - day older than `last_active_date`: ignored; callers log the anomaly
    ///
    /// After any applied transition `last_active_date == day` and
    /// `max_streak >= current_streak`.
    pub fn advance(&mut self, day: NaiveDate) -> StreakTransition {
        if day < self.last_active_date {
            return StreakTransition::Unchanged;
        }

        let transition = if Some(self.last_active_date) == day.checked_sub_days(Days::new(1)) {
            self.current_streak += 1;
            StreakTransition::Extended
        } else if self.last_active_date < day {
            self.current_streak = 1;
            StreakTransition::Restarted
        } else {
            // Same day re-evaluated
            StreakTransition::Unchanged
        };

        self.last_active_date = day;
        self.max_streak = self.max_streak.max(self.current_streak);
        transition
    }

    /// Apply a non-qualifying day.
    ///
    /// Clears the streak unless the record already reflects `day` (a stale
    /// recompute must not overwrite a same-day qualifying result). Days older
    /// than `last_active_date` are ignored.
    pub fn reset(&mut self, day: NaiveDate) -> StreakTransition {
        if day < self.last_active_date || day == self.last_active_date {
            return StreakTransition::Unchanged;
        }

        self.current_streak = 0;
        self.last_active_date = day;
        StreakTransition::Cleared
    }

    /// Whether the user has already been credited for `today`
    #[must_use]
    pub fn is_active_today(&self, today: NaiveDate) -> bool {
        self.last_active_date == today && self.current_streak > 0
    }
}

/// One day of reconstructed activity history (derived, not persisted)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityHistoryEntry {
    /// Calendar day
    pub date: NaiveDate,
    /// Whether the day met the streak-qualification predicate
    pub is_active: bool,
    /// Exercise completion rate that day, 0-100
    pub exercise_completion_rate: i32,
    /// Medication completion rate that day, 0-100
    pub medication_completion_rate: i32,
}

impl ActivityHistoryEntry {
    /// Synthesized entry for a day with no summary record
    #[must_use]
    pub const fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            is_active: false,
            exercise_completion_rate: 0,
            medication_completion_rate: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn streak_at(current: i32, max: i32, last_active: &str) -> UserStreak {
        let mut s = UserStreak::initial(Uuid::new_v4(), day(last_active));
        s.current_streak = current;
        s.max_streak = max;
        s
    }

    #[test]
    fn advance_on_consecutive_day_extends() {
        let mut s = streak_at(3, 5, "2025-08-06");
        assert_eq!(s.advance(day("2025-08-07")), StreakTransition::Extended);
        assert_eq!(s.current_streak, 4);
        assert_eq!(s.last_active_date, day("2025-08-07"));
        assert_eq!(s.max_streak, 5);
    }

    #[test]
    fn advance_after_gap_restarts_at_one() {
        let mut s = streak_at(7, 7, "2025-08-01");
        assert_eq!(s.advance(day("2025-08-04")), StreakTransition::Restarted);
        assert_eq!(s.current_streak, 1);
        assert_eq!(s.last_active_date, day("2025-08-04"));
        assert_eq!(s.max_streak, 7);
    }

    #[test]
    fn advance_same_day_is_idempotent() {
        let mut s = streak_at(3, 3, "2025-08-06");
        s.advance(day("2025-08-07"));
        assert_eq!(s.current_streak, 4);
        assert_eq!(s.advance(day("2025-08-07")), StreakTransition::Unchanged);
        assert_eq!(s.current_streak, 4);
        assert_eq!(s.max_streak, 4);
    }

    #[test]
    fn advance_ignores_out_of_order_day() {
        let mut s = streak_at(4, 4, "2025-08-07");
        assert_eq!(s.advance(day("2025-08-05")), StreakTransition::Unchanged);
        assert_eq!(s.current_streak, 4);
        assert_eq!(s.last_active_date, day("2025-08-07"));
    }

    #[test]
    fn reset_clears_on_new_day_only() {
        let mut s = streak_at(4, 6, "2025-08-06");
        assert_eq!(s.reset(day("2025-08-07")), StreakTransition::Cleared);
        assert_eq!(s.current_streak, 0);
        assert_eq!(s.last_active_date, day("2025-08-07"));
        assert_eq!(s.max_streak, 6);

        // A stale non-qualifying recompute for the same day is a no-op.
        let mut s = streak_at(4, 6, "2025-08-07");
        assert_eq!(s.reset(day("2025-08-07")), StreakTransition::Unchanged);
        assert_eq!(s.current_streak, 4);
    }

    #[test]
    fn reset_ignores_out_of_order_day() {
        let mut s = streak_at(4, 6, "2025-08-07");
        assert_eq!(s.reset(day("2025-08-05")), StreakTransition::Unchanged);
        assert_eq!(s.current_streak, 4);
        assert_eq!(s.last_active_date, day("2025-08-07"));
    }

    #[test]
    fn max_streak_never_decreases_and_dominates_current() {
        let mut s = streak_at(0, 0, "2025-08-01");
        let days = [
            "2025-08-02",
            "2025-08-03",
            "2025-08-04",
        ];
        for d in days {
            s.advance(day(d));
            assert!(s.max_streak >= s.current_streak);
        }
        assert_eq!((s.current_streak, s.max_streak), (3, 3));

        s.reset(day("2025-08-06"));
        assert_eq!((s.current_streak, s.max_streak), (0, 3));

        s.advance(day("2025-08-07"));
        assert!(s.max_streak >= s.current_streak);
        assert_eq!((s.current_streak, s.max_streak), (1, 3));
    }

    #[test]
    fn active_today_requires_same_day_and_positive_streak() {
        let s = streak_at(2, 2, "2025-08-07");
        assert!(s.is_active_today(day("2025-08-07")));
        assert!(!s.is_active_today(day("2025-08-08")));

        let cleared = streak_at(0, 5, "2025-08-07");
        assert!(!cleared.is_active_today(day("2025-08-07")));
    }

    #[test]
    fn first_qualifying_day_on_creation_day_stays_zero() {
        // The record is created with last_active = today, so a same-day
        // advance is the documented no-op; the streak starts counting the
        // next day.
        let mut s = UserStreak::initial(Uuid::new_v4(), day("2025-08-07"));
        assert_eq!(s.advance(day("2025-08-07")), StreakTransition::Unchanged);
        assert_eq!(s.current_streak, 0);
        assert_eq!(s.advance(day("2025-08-08")), StreakTransition::Extended);
        assert_eq!(s.current_streak, 1);
    }
}
