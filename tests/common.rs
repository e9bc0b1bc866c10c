// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database creation and fixture seeding helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

#![allow(
    dead_code,
    missing_docs,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Shared test utilities for `rehab_tracker`
//!
//! Common setup functions to reduce duplication across integration tests.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rehab_tracker::database::Database;
use rehab_tracker::models::{NewDailySummary, PlanDomain, PlanStatus};
use std::sync::Once;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new("sqlite::memory:").await?)
}

/// Noon UTC on the given day; keeps log timestamps inside the day window
pub fn noon(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
}

/// Today's calendar date as the services see it
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Create an active plan with the given prescribed item counts per domain
pub async fn create_active_plan(
    database: &Database,
    user_id: Uuid,
    exercises: usize,
    medications: usize,
    diets: usize,
) -> Result<i64> {
    let plans = database.plans();
    let plan_id = plans
        .create_plan(user_id, "Knee recovery", PlanStatus::Active, Utc::now())
        .await?;

    for i in 0..exercises {
        plans
            .add_item(plan_id, PlanDomain::Exercise, &format!("Exercise {i}"))
            .await?;
    }
    for i in 0..medications {
        plans
            .add_item(plan_id, PlanDomain::Medication, &format!("Medication {i}"))
            .await?;
    }
    for i in 0..diets {
        plans
            .add_item(plan_id, PlanDomain::Diet, &format!("Meal {i}"))
            .await?;
    }

    Ok(plan_id)
}

/// Log an exercise session at noon of `date`
pub async fn log_exercise(
    database: &Database,
    user_id: Uuid,
    date: NaiveDate,
    completion_rate: i32,
) -> Result<i64> {
    Ok(database
        .activity_logs()
        .insert_exercise_log(user_id, noon(date), Some(completion_rate), None, None, None)
        .await?)
}

/// Log an exercise session with side metrics
pub async fn log_exercise_with_metrics(
    database: &Database,
    user_id: Uuid,
    date: NaiveDate,
    completion_rate: i32,
    pain_after: Option<i32>,
    rpe: Option<i32>,
    duration_sec: Option<i32>,
) -> Result<i64> {
    Ok(database
        .activity_logs()
        .insert_exercise_log(
            user_id,
            noon(date),
            Some(completion_rate),
            pain_after,
            rpe,
            duration_sec,
        )
        .await?)
}

/// Log a medication intake at noon of `date`
pub async fn log_medication(
    database: &Database,
    user_id: Uuid,
    date: NaiveDate,
    taken: bool,
) -> Result<i64> {
    Ok(database
        .activity_logs()
        .insert_medication_log(user_id, noon(date), taken)
        .await?)
}

/// Log a diet event at noon of `date`
pub async fn log_diet(
    database: &Database,
    user_id: Uuid,
    date: NaiveDate,
    completed: bool,
    portion_consumed: Option<i32>,
) -> Result<i64> {
    Ok(database
        .activity_logs()
        .insert_diet_log(user_id, noon(date), completed, portion_consumed)
        .await?)
}

/// Seed a streak record directly, bypassing the state machine
pub async fn seed_streak(
    database: &Database,
    user_id: Uuid,
    current_streak: i32,
    max_streak: i32,
    last_active_date: NaiveDate,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r"
        INSERT INTO user_streaks
            (user_id, current_streak, max_streak, last_active_date, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        ",
    )
    .bind(user_id.to_string())
    .bind(current_streak)
    .bind(max_streak)
    .bind(last_active_date.to_string())
    .bind(now)
    .execute(database.pool())
    .await?;
    Ok(())
}

/// Seed a daily summary with the given completion rates
pub async fn seed_summary(
    database: &Database,
    user_id: Uuid,
    date: NaiveDate,
    exercise_completion_rate: i32,
    medication_completion_rate: i32,
) -> Result<()> {
    database
        .summaries()
        .upsert(&NewDailySummary {
            user_id,
            date,
            all_exercises_completed: exercise_completion_rate >= 100,
            exercise_completion_rate,
            all_medications_taken: medication_completion_rate >= 100,
            medication_completion_rate,
            all_diet_completed: false,
            diet_completion_rate: 0,
            avg_pain_score: None,
            total_duration_sec: 0,
            daily_metrics: serde_json::json!({}),
        })
        .await?;
    Ok(())
}
