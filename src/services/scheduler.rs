// ABOUTME: Background scheduler for streak maintenance jobs
// ABOUTME: Daily stale sweep after midnight, hourly statistics, periodic outbox drain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! Streak maintenance scheduler
//!
//! Runs fully decoupled from request handling:
//! - a daily sweep (during the configured hour, shortly after midnight by
//!   default) that resets streaks for users who stopped logging entirely
//! - an hourly active-streak count for observability
//! - a periodic drain of the streak-update outbox
//!
//! Every job logs failures and keeps running; nothing here can fail a
//! request.

use std::sync::Arc;

use chrono::{Timelike, Utc};
use tokio::time::Duration;
use tracing::{error, info};

use crate::config::environment::SchedulerConfig;
use crate::constants::time;
use crate::services::streak::StreakService;

/// Background scheduler for streak maintenance
pub struct StreakScheduler {
    config: SchedulerConfig,
    streaks: Arc<StreakService>,
}

impl StreakScheduler {
    /// Create the scheduler
    #[must_use]
    pub const fn new(config: SchedulerConfig, streaks: Arc<StreakService>) -> Self {
        Self { config, streaks }
    }

    /// Spawn the background jobs. Idle when disabled by configuration.
    pub fn start(self: &Arc<Self>) {
        if !self.config.enabled {
            info!("Streak scheduler disabled");
            return;
        }

        info!(
            sweep_hour = self.config.sweep_hour,
            outbox_interval_secs = self.config.outbox_drain_interval_secs,
            "Starting streak scheduler"
        );

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(time::HOUR_SECONDS));
            loop {
                interval.tick().await;
                let now = Utc::now();
                if u8::try_from(now.hour()).unwrap_or(u8::MAX) == scheduler.config.sweep_hour {
                    scheduler.run_sweep().await;
                }
            }
        });

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(time::HOUR_SECONDS));
            loop {
                interval.tick().await;
                scheduler.report_statistics().await;
            }
        });

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(
                scheduler.config.outbox_drain_interval_secs.max(time::MINUTE_SECONDS),
            ));
            loop {
                interval.tick().await;
                if let Err(e) = scheduler.streaks.drain_outbox().await {
                    error!(error = %e, "Streak outbox drain failed");
                }
            }
        });
    }

    /// One sweep pass; never raises, failures are logged
    pub async fn run_sweep(&self) {
        info!("Starting stale streak cleanup");
        match self.streaks.cleanup_stale_streaks().await {
            Ok(reset_count) => {
                info!(reset_count, "Stale streak cleanup completed");
            }
            Err(e) => {
                error!(error = %e, "Stale streak cleanup failed");
            }
        }
    }

    /// One statistics pass; never raises, failures are logged
    pub async fn report_statistics(&self) {
        match self.streaks.count_active_streaks().await {
            Ok(active) => {
                info!(active, "Current active streaks");
            }
            Err(e) => {
                error!(error = %e, "Failed to count active streaks");
            }
        }
    }
}
