// ABOUTME: Main library entry point for the rehab-tracker backend
// ABOUTME: Daily activity aggregation, streak continuity tracking, and HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

#![deny(unsafe_code)]

//! # Rehab Tracker
//!
//! Backend for a consumer rehabilitation tracking application. Users log
//! exercises, medication intake, and diet events against a prescribed plan;
//! this crate aggregates those logs into per-day completion summaries and a
//! derived streak (consecutive qualifying-activity days) shown on the home
//! screen.
//!
//! ## Architecture
//!
//! The crate follows a layered architecture:
//! - **Models**: Daily summaries, user streaks, and activity log records
//! - **Database**: `SQLite` persistence through domain-scoped managers
//! - **Services**: Completion aggregation, the streak state machine, and
//!   the background sweep scheduler
//! - **Routes**: HTTP endpoints for summaries and streaks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rehab_tracker::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Rehab Tracker configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the server binary (src/bin/) and integration
// tests (tests/). They must remain `pub` so external consumers can access
// them.

/// Configuration management from environment variables
pub mod config;

/// Application constants and threshold values
pub mod constants;

/// Shared dependency bundle for route handlers and background jobs
pub mod context;

/// `SQLite` persistence layer with domain-scoped managers
pub mod database;

/// Unified error handling with `AppError` and `ErrorCode`
pub mod errors;

/// Logging configuration and structured logging setup
pub mod logging;

/// Domain models: summaries, streaks, and activity logs
pub mod models;

/// HTTP routes for summaries, streaks, and health checks
pub mod routes;

/// Domain services: aggregation, streak state machine, scheduler
pub mod services;
