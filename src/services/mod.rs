// ABOUTME: Domain service organization for aggregation, streaks, and scheduling
// ABOUTME: Services hold the business rules; routes stay as thin handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! Domain services

/// Completion aggregation and daily summary upsert
pub mod daily_summary;
/// Background jobs: stale sweep, statistics, outbox drain
pub mod scheduler;
/// Streak state machine, history reconstruction, and the stale sweep
pub mod streak;

pub use daily_summary::DailySummaryService;
pub use scheduler::StreakScheduler;
pub use streak::{StreakOverview, StreakService};
