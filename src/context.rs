// ABOUTME: Shared dependency bundle handed to route handlers and background jobs
// ABOUTME: Owns the database handle, configuration, and the domain services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

use std::sync::Arc;

use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::services::{DailySummaryService, StreakService};

/// Dependencies shared by all route handlers and background jobs
pub struct ServerResources {
    /// Database handle
    pub database: Database,
    /// Server configuration
    pub config: ServerConfig,
    /// Daily summary aggregation and reads
    pub summary_service: Arc<DailySummaryService>,
    /// Streak state machine and reads
    pub streak_service: Arc<StreakService>,
}

impl ServerResources {
    /// Wire up the services over one database handle
    #[must_use]
    pub fn new(database: Database, config: ServerConfig) -> Self {
        let streak_service = Arc::new(StreakService::new(database.clone()));
        let summary_service = Arc::new(DailySummaryService::new(
            database.clone(),
            Arc::clone(&streak_service),
        ));

        Self {
            database,
            config,
            summary_service,
            streak_service,
        }
    }
}
