// ABOUTME: Completion aggregator and daily summary service
// ABOUTME: Recomputes one user's day from raw logs and upserts the summary record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! Daily summary service
//!
//! `recompute_daily_summary` is triggered by every log-creation event: it
//! re-aggregates the whole day from the raw logs (idempotent), overwrites
//! the summary record, and then feeds the day's exercise and medication
//! rates into the streak state machine. The streak side effect is
//! best-effort: a failure is logged and parked in the outbox, never
//! surfaced to the caller.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::constants::thresholds;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{DietLog, ExerciseLog, MedicationLog, NewDailySummary, PlanDomain};
use crate::services::streak::StreakService;

/// Completion of one activity domain against the prescribed item count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainCompletion {
    /// Prescribed items in this domain (the denominator)
    pub total: i64,
    /// Logged events that counted toward completion
    pub completed: i64,
    /// `floor(completed * 100 / total)`, capped at 100; 0 when nothing is
    /// prescribed
    pub completion_rate: i32,
    /// Whether every prescribed item was satisfied; vacuously true when
    /// nothing is prescribed
    pub all_completed: bool,
}

impl DomainCompletion {
    /// A domain with nothing prescribed: rate 0, vacuously complete
    pub const VACUOUS: Self = Self {
        total: 0,
        completed: 0,
        completion_rate: 0,
        all_completed: true,
    };

    fn from_counts(total: i64, completed: i64) -> Self {
        if total == 0 {
            return Self::VACUOUS;
        }
        let completion_rate = ((completed * 100) / total).min(100) as i32;
        Self {
            total,
            completed,
            completion_rate,
            all_completed: completed >= total,
        }
    }
}

/// Side metrics derived from the day's exercise logs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExerciseMetrics {
    /// Rounded average post-activity pain score, None when no log reported one
    pub avg_pain_score: Option<i32>,
    /// Average effort rating to one decimal, 0.0 when no log reported one
    pub avg_rpe: f64,
    /// Sum of reported durations in seconds
    pub total_duration_sec: i32,
}

/// Full aggregation result for one user and day
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    /// Exercise completion
    pub exercise: DomainCompletion,
    /// Exercise side metrics
    pub exercise_metrics: ExerciseMetrics,
    /// Medication completion
    pub medication: DomainCompletion,
    /// Diet completion
    pub diet: DomainCompletion,
}

/// Exercise completion from the day's logs.
///
/// A log counts when its self-reported completion percentage reaches the
/// counted threshold. Side metrics average only over logs that reported the
/// respective field.
#[must_use]
pub fn exercise_completion(logs: &[ExerciseLog], prescribed: i64) -> (DomainCompletion, ExerciseMetrics) {
    if prescribed == 0 {
        return (
            DomainCompletion::VACUOUS,
            ExerciseMetrics {
                avg_pain_score: None,
                avg_rpe: 0.0,
                total_duration_sec: 0,
            },
        );
    }

    let completed = logs
        .iter()
        .filter(|log| {
            log.completion_rate
                .is_some_and(|rate| rate >= thresholds::EXERCISE_COUNTED_MIN_RATE)
        })
        .count() as i64;

    let pain_scores: Vec<i32> = logs.iter().filter_map(|log| log.pain_after).collect();
    let avg_pain_score = if pain_scores.is_empty() {
        None
    } else {
        let avg = f64::from(pain_scores.iter().sum::<i32>()) / pain_scores.len() as f64;
        Some(avg.round() as i32)
    };

    let rpes: Vec<i32> = logs.iter().filter_map(|log| log.rpe).collect();
    let avg_rpe = if rpes.is_empty() {
        0.0
    } else {
        let avg = f64::from(rpes.iter().sum::<i32>()) / rpes.len() as f64;
        (avg * 10.0).round() / 10.0
    };

    let total_duration_sec = logs.iter().filter_map(|log| log.duration_sec).sum();

    (
        DomainCompletion::from_counts(prescribed, completed),
        ExerciseMetrics {
            avg_pain_score,
            avg_rpe,
            total_duration_sec,
        },
    )
}

/// Medication completion from the day's logs: a log counts when the dose
/// was actually taken.
#[must_use]
pub fn medication_completion(logs: &[MedicationLog], prescribed: i64) -> DomainCompletion {
    if prescribed == 0 {
        return DomainCompletion::VACUOUS;
    }
    let taken = logs.iter().filter(|log| log.taken).count() as i64;
    DomainCompletion::from_counts(prescribed, taken)
}

/// Diet completion from the day's logs: a log counts when explicitly marked
/// completed or when enough of the portion was consumed.
#[must_use]
pub fn diet_completion(logs: &[DietLog], prescribed: i64) -> DomainCompletion {
    if prescribed == 0 {
        return DomainCompletion::VACUOUS;
    }
    let completed = logs
        .iter()
        .filter(|log| {
            log.completed
                || log
                    .portion_consumed
                    .is_some_and(|portion| portion >= thresholds::DIET_COUNTED_MIN_PORTION)
        })
        .count() as i64;
    DomainCompletion::from_counts(prescribed, completed)
}

/// Daily summary service
pub struct DailySummaryService {
    database: Database,
    streaks: Arc<StreakService>,
}

impl DailySummaryService {
    /// Create the service
    #[must_use]
    pub const fn new(database: Database, streaks: Arc<StreakService>) -> Self {
        Self { database, streaks }
    }

    /// Get the stored summary for a user and day.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when no summary exists for that day (a day
    /// with no logged activity is distinguishable from an error), or a
    /// database error.
    pub async fn get_daily_summary(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<crate::models::DailySummary> {
        self.database
            .summaries()
            .get(user_id, date)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Daily summary")
                    .with_user_id(user_id)
                    .with_resource_id(date.to_string())
            })
    }

    /// Recompute and persist the summary for the day containing `timestamp`,
    /// then advance the streak with the day's rates.
    ///
    /// Skips (without error) when the user has no active plan. The streak
    /// side effect never fails this call: an error there is logged and
    /// enqueued for retry.
    ///
    /// # Errors
    ///
    /// Returns an error if log lookups or the summary write fail
    pub async fn recompute_daily_summary(
        &self,
        user_id: Uuid,
        timestamp: DateTime<Utc>,
    ) -> AppResult<()> {
        let date = timestamp.date_naive();
        info!(%user_id, %date, "Recomputing daily summary");

        let Some(plan) = self.database.plans().active_plan(user_id).await? else {
            warn!(%user_id, %date, "No active plan, skipping daily summary update");
            return Ok(());
        };

        let outcome = self.aggregate(user_id, plan.id, date).await?;

        let daily_metrics = json!({
            "total_exercises": outcome.exercise.total,
            "completed_exercises": outcome.exercise.completed,
            "avg_rpe": outcome.exercise_metrics.avg_rpe,
            "total_medications": outcome.medication.total,
            "taken_medications": outcome.medication.completed,
            "total_diets": outcome.diet.total,
            "completed_diets": outcome.diet.completed,
        });

        let summary = self
            .database
            .summaries()
            .upsert(&NewDailySummary {
                user_id,
                date,
                all_exercises_completed: outcome.exercise.all_completed,
                exercise_completion_rate: outcome.exercise.completion_rate,
                all_medications_taken: outcome.medication.all_completed,
                medication_completion_rate: outcome.medication.completion_rate,
                all_diet_completed: outcome.diet.all_completed,
                diet_completion_rate: outcome.diet.completion_rate,
                avg_pain_score: outcome.exercise_metrics.avg_pain_score,
                total_duration_sec: outcome.exercise_metrics.total_duration_sec,
                daily_metrics,
            })
            .await?;

        info!(
            %user_id, %date,
            exercise = summary.exercise_completion_rate,
            medication = summary.medication_completion_rate,
            diet = summary.diet_completion_rate,
            "Daily summary updated"
        );

        // Streak update is best-effort: the summary write must never fail
        // because of streak problems.
        if let Err(e) = self
            .streaks
            .update_from_daily_summary(
                user_id,
                date,
                summary.exercise_completion_rate,
                summary.medication_completion_rate,
            )
            .await
        {
            error!(%user_id, %date, error = %e, "Streak update failed, parking in outbox");
            if let Err(enqueue_err) = self
                .database
                .outbox()
                .enqueue(
                    user_id,
                    date,
                    summary.exercise_completion_rate,
                    summary.medication_completion_rate,
                    &e.to_string(),
                )
                .await
            {
                error!(%user_id, %date, error = %enqueue_err, "Failed to enqueue streak update");
            }
        }

        Ok(())
    }

    /// Aggregate one user's day against the plan's prescribed item counts.
    ///
    /// A failed prescribed-count lookup degrades that domain's denominator
    /// to zero instead of failing the whole aggregation.
    async fn aggregate(
        &self,
        user_id: Uuid,
        plan_id: i64,
        date: NaiveDate,
    ) -> AppResult<CompletionOutcome> {
        let plans = self.database.plans();
        let logs = self.database.activity_logs();

        let prescribed_exercises = Self::count_or_zero(
            plans.count_items(plan_id, PlanDomain::Exercise).await,
            user_id,
            PlanDomain::Exercise,
        );
        let prescribed_medications = Self::count_or_zero(
            plans.count_items(plan_id, PlanDomain::Medication).await,
            user_id,
            PlanDomain::Medication,
        );
        let prescribed_diets = Self::count_or_zero(
            plans.count_items(plan_id, PlanDomain::Diet).await,
            user_id,
            PlanDomain::Diet,
        );

        let exercise_logs = logs.exercise_logs_on(user_id, date).await?;
        let medication_logs = logs.medication_logs_on(user_id, date).await?;
        let diet_logs = logs.diet_logs_on(user_id, date).await?;

        let (exercise, exercise_metrics) =
            exercise_completion(&exercise_logs, prescribed_exercises);

        Ok(CompletionOutcome {
            exercise,
            exercise_metrics,
            medication: medication_completion(&medication_logs, prescribed_medications),
            diet: diet_completion(&diet_logs, prescribed_diets),
        })
    }

    fn count_or_zero(result: AppResult<i64>, user_id: Uuid, domain: PlanDomain) -> i64 {
        match result {
            Ok(count) => count,
            Err(e) => {
                warn!(%user_id, %domain, error = %e, "Prescribed item count unavailable, treating as zero");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise_log(completion: Option<i32>, pain: Option<i32>, rpe: Option<i32>, duration: Option<i32>) -> ExerciseLog {
        ExerciseLog {
            id: 0,
            user_id: Uuid::new_v4(),
            logged_at: Utc::now(),
            completion_rate: completion,
            pain_after: pain,
            rpe,
            duration_sec: duration,
            notes: None,
        }
    }

    #[test]
    fn counted_exercise_needs_eighty_percent() {
        let logs = vec![
            exercise_log(Some(100), None, None, None),
            exercise_log(Some(80), None, None, None),
            exercise_log(Some(79), None, None, None),
            exercise_log(None, None, None, None),
        ];
        let (completion, _) = exercise_completion(&logs, 4);
        assert_eq!(completion.completed, 2);
        assert_eq!(completion.completion_rate, 50);
        assert!(!completion.all_completed);
    }

    #[test]
    fn completion_rate_uses_floor_division() {
        // 4 of 5 counted: 80%, all_completed stays false
        let logs: Vec<ExerciseLog> = (0..4).map(|_| exercise_log(Some(90), None, None, None)).collect();
        let (completion, _) = exercise_completion(&logs, 5);
        assert_eq!(completion.completion_rate, 80);
        assert!(!completion.all_completed);

        // 2 of 3: floor(66.67) = 66
        let logs: Vec<ExerciseLog> = (0..2).map(|_| exercise_log(Some(90), None, None, None)).collect();
        let (completion, _) = exercise_completion(&logs, 3);
        assert_eq!(completion.completion_rate, 66);
    }

    #[test]
    fn completion_rate_is_capped_at_one_hundred() {
        let logs: Vec<ExerciseLog> = (0..7).map(|_| exercise_log(Some(90), None, None, None)).collect();
        let (completion, _) = exercise_completion(&logs, 5);
        assert_eq!(completion.completion_rate, 100);
        assert!(completion.all_completed);
    }

    #[test]
    fn zero_prescribed_is_vacuously_complete() {
        let logs = vec![exercise_log(Some(100), Some(5), Some(7), Some(600))];
        let (completion, metrics) = exercise_completion(&logs, 0);
        assert_eq!(completion, DomainCompletion::VACUOUS);
        assert_eq!(completion.completion_rate, 0);
        assert!(completion.all_completed);
        assert_eq!(metrics.avg_pain_score, None);
        assert_eq!(metrics.total_duration_sec, 0);

        assert_eq!(medication_completion(&[], 0), DomainCompletion::VACUOUS);
        assert_eq!(diet_completion(&[], 0), DomainCompletion::VACUOUS);
    }

    #[test]
    fn exercise_metrics_average_only_reported_fields() {
        let logs = vec![
            exercise_log(Some(90), Some(4), Some(6), Some(300)),
            exercise_log(Some(90), Some(7), None, Some(450)),
            exercise_log(Some(90), None, Some(7), None),
        ];
        let (_, metrics) = exercise_completion(&logs, 3);
        // (4 + 7) / 2 = 5.5 rounds to 6
        assert_eq!(metrics.avg_pain_score, Some(6));
        // (6 + 7) / 2 = 6.5
        assert!((metrics.avg_rpe - 6.5).abs() < f64::EPSILON);
        assert_eq!(metrics.total_duration_sec, 750);
    }

    #[test]
    fn medication_counts_taken_doses_only() {
        let mk = |taken| MedicationLog {
            id: 0,
            user_id: Uuid::new_v4(),
            taken_at: Utc::now(),
            taken,
            notes: None,
        };
        let logs = vec![mk(true), mk(true), mk(false)];
        let completion = medication_completion(&logs, 2);
        assert_eq!(completion.completed, 2);
        assert_eq!(completion.completion_rate, 100);
        assert!(completion.all_completed);
    }

    #[test]
    fn diet_counts_completed_flag_or_portion() {
        let mk = |completed, portion| DietLog {
            id: 0,
            user_id: Uuid::new_v4(),
            logged_at: Utc::now(),
            completed,
            portion_consumed: portion,
            notes: None,
        };
        let logs = vec![
            mk(true, None),
            mk(false, Some(80)),
            mk(false, Some(79)),
            mk(false, None),
        ];
        let completion = diet_completion(&logs, 4);
        assert_eq!(completion.completed, 2);
        assert_eq!(completion.completion_rate, 50);
    }
}
