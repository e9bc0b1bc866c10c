// ABOUTME: SQLite persistence layer for the rehab-tracker backend
// ABOUTME: Owns the connection pool, runs migrations, and hands out domain managers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! `SQLite` database wrapper and schema migrations
//!
//! The [`Database`] owns a `SqlitePool` and creates the schema on startup.
//! Domain operations live in manager structs ([`SummaryManager`],
//! [`StreakManager`], [`ActivityLogManager`], [`PlanManager`],
//! [`OutboxManager`]) that wrap the pool.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub mod activity_logs;
pub mod outbox;
pub mod plans;
pub mod streaks;
pub mod summaries;

pub use activity_logs::ActivityLogManager;
pub use outbox::OutboxManager;
pub use plans::PlanManager;
pub use streaks::StreakManager;
pub use summaries::SummaryManager;

/// `SQLite` database handle
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if necessary) the database at `database_url` and run
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the schema
    /// cannot be created
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {database_url}"))?
            .create_if_missing(true);

        // An in-memory SQLite database exists per connection; the pool must
        // hold exactly one connection for its lifetime or the schema vanishes.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await
        }
        .with_context(|| format!("Failed to connect to database: {database_url}"))?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Access the underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Daily summary operations
    #[must_use]
    pub fn summaries(&self) -> SummaryManager {
        SummaryManager::new(self.pool.clone())
    }

    /// Streak record operations
    #[must_use]
    pub fn streaks(&self) -> StreakManager {
        StreakManager::new(self.pool.clone())
    }

    /// Activity log lookups
    #[must_use]
    pub fn activity_logs(&self) -> ActivityLogManager {
        ActivityLogManager::new(self.pool.clone())
    }

    /// Plan and prescribed-item lookups
    #[must_use]
    pub fn plans(&self) -> PlanManager {
        PlanManager::new(self.pool.clone())
    }

    /// Pending streak update operations
    #[must_use]
    pub fn outbox(&self) -> OutboxManager {
        OutboxManager::new(self.pool.clone())
    }

    /// Create the schema if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS daily_summaries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                all_exercises_completed INTEGER NOT NULL DEFAULT 0,
                exercise_completion_rate INTEGER NOT NULL DEFAULT 0,
                all_medications_taken INTEGER NOT NULL DEFAULT 0,
                medication_completion_rate INTEGER NOT NULL DEFAULT 0,
                all_diet_completed INTEGER NOT NULL DEFAULT 0,
                diet_completion_rate INTEGER NOT NULL DEFAULT 0,
                avg_pain_score INTEGER,
                total_duration_sec INTEGER NOT NULL DEFAULT 0,
                daily_metrics TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(user_id, date)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create daily_summaries table")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_streaks (
                user_id TEXT PRIMARY KEY,
                current_streak INTEGER NOT NULL DEFAULT 0,
                max_streak INTEGER NOT NULL DEFAULT 0,
                last_active_date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create user_streaks table")?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_user_streaks_last_active
            ON user_streaks(last_active_date)
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create user_streaks index")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercise_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                logged_at TEXT NOT NULL,
                completion_rate INTEGER,
                pain_after INTEGER,
                rpe INTEGER,
                duration_sec INTEGER,
                notes TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create exercise_logs table")?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_exercise_logs_user_logged
            ON exercise_logs(user_id, logged_at)
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create exercise_logs index")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS medication_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                taken_at TEXT NOT NULL,
                taken INTEGER NOT NULL DEFAULT 0,
                notes TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create medication_logs table")?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_medication_logs_user_taken
            ON medication_logs(user_id, taken_at)
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create medication_logs index")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS diet_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                logged_at TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                portion_consumed INTEGER,
                notes TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create diet_logs table")?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_diet_logs_user_logged
            ON diet_logs(user_id, logged_at)
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create diet_logs index")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS rehab_plans (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create rehab_plans table")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS plan_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                plan_id INTEGER NOT NULL,
                domain TEXT NOT NULL,
                name TEXT NOT NULL,
                FOREIGN KEY (plan_id) REFERENCES rehab_plans(id)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create plan_items table")?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS streak_update_outbox (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                exercise_completion_rate INTEGER NOT NULL,
                medication_completion_rate INTEGER NOT NULL,
                attempts INTEGER NOT NULL DEFAULT 0,
                last_error TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create streak_update_outbox table")?;

        Ok(())
    }
}
