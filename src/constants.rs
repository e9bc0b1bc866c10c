// ABOUTME: Application constants for thresholds, defaults, and environment names
// ABOUTME: Centralizes domain tuning values so they are defined exactly once
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! Application-wide constants grouped by concern

/// Completion and streak-qualification thresholds
pub mod thresholds {
    /// Minimum self-reported completion percentage for an exercise log to
    /// count toward the day's completion rate
    pub const EXERCISE_COUNTED_MIN_RATE: i32 = 80;

    /// Minimum consumed-portion percentage for a diet log to count as
    /// completed when the explicit completed flag is unset
    pub const DIET_COUNTED_MIN_PORTION: i32 = 80;

    /// Exercise completion rate at or above which a day qualifies for the
    /// streak
    pub const STREAK_EXERCISE_MIN_RATE: i32 = 60;

    /// Medication completion rate at or above which a day qualifies for the
    /// streak
    pub const STREAK_MEDICATION_MIN_RATE: i32 = 70;
}

/// Time conversion constants
pub mod time {
    /// Seconds in one hour
    pub const HOUR_SECONDS: u64 = 3600;

    /// Seconds in one minute
    pub const MINUTE_SECONDS: u64 = 60;
}

/// Activity history range limits
pub mod limits {
    /// Minimum number of days in an activity history request
    pub const HISTORY_RANGE_MIN: u32 = 1;

    /// Maximum number of days in an activity history request
    pub const HISTORY_RANGE_MAX: u32 = 90;

    /// Maximum delivery attempts for a pending streak update before the
    /// outbox stops retrying it
    pub const OUTBOX_MAX_ATTEMPTS: i32 = 10;

    /// Maximum pending streak updates processed per outbox drain pass
    pub const OUTBOX_DRAIN_BATCH: i64 = 100;
}

/// Default configuration values
pub mod defaults {
    /// Default HTTP port for the server
    pub const HTTP_PORT: u16 = 8080;

    /// Default activity history range in days
    pub const HISTORY_RANGE_DAYS: u32 = 30;

    /// Default SQLite database path
    pub const DATABASE_PATH: &str = "data/rehab-tracker.db";

    /// Hour of day (UTC) at which the stale streak sweep runs
    pub const SWEEP_HOUR: u8 = 0;

    /// Interval in seconds between outbox drain passes
    pub const OUTBOX_DRAIN_INTERVAL_SECS: u64 = 300;
}

/// Environment variable names
pub mod env_config {
    /// HTTP port override
    pub const HTTP_PORT: &str = "HTTP_PORT";

    /// Database URL (`sqlite:path` or `sqlite::memory:`)
    pub const DATABASE_URL: &str = "DATABASE_URL";

    /// Deployment environment (development, production, testing)
    pub const ENVIRONMENT: &str = "ENVIRONMENT";

    /// Hour of day (UTC, 0-23) for the stale streak sweep
    pub const SWEEP_HOUR: &str = "SWEEP_HOUR";

    /// Log format selection (json, pretty, compact)
    pub const LOG_FORMAT: &str = "LOG_FORMAT";

    /// Log level filter, standard tracing syntax
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Service identity for structured logging
pub mod service_names {
    /// Canonical service name
    pub const REHAB_TRACKER: &str = "rehab-tracker";
}
