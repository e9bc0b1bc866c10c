// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! Environment-based configuration management for production deployment

use crate::constants::{defaults, env_config};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment type for deployment-specific behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// In-memory `SQLite` database (tests and ephemeral runs)
    Memory,
}

impl DatabaseUrl {
    /// Parse from a `DATABASE_URL` style string
    #[must_use]
    pub fn from_url_string(url: &str) -> Self {
        if url == "sqlite::memory:" || url == ":memory:" {
            Self::Memory
        } else {
            let path = url.strip_prefix("sqlite:").unwrap_or(url);
            Self::SQLite {
                path: PathBuf::from(path),
            }
        }
    }

    /// Render as a `sqlx` connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}?mode=rwc", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from(defaults::DATABASE_PATH),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Where the database lives
    pub url: DatabaseUrl,
}

/// Background scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the background jobs are started at all
    pub enabled: bool,
    /// Hour of day (UTC, 0-23) at which the stale streak sweep runs
    pub sweep_hour: u8,
    /// Interval in seconds between outbox drain passes
    pub outbox_drain_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_hour: defaults::SWEEP_HOUR,
            outbox_drain_interval_secs: defaults::OUTBOX_DRAIN_INTERVAL_SECS,
        }
    }
}

/// Server configuration loaded from the environment
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Background scheduler configuration
    pub scheduler: SchedulerConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a present variable fails to parse
    pub fn from_env() -> Result<Self> {
        let http_port = match env::var(env_config::HTTP_PORT) {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("Invalid {}: {value}", env_config::HTTP_PORT))?,
            Err(_) => defaults::HTTP_PORT,
        };

        let environment = Environment::from_str_or_default(
            &env::var(env_config::ENVIRONMENT).unwrap_or_default(),
        );

        let url = env::var(env_config::DATABASE_URL)
            .map_or_else(|_| DatabaseUrl::default(), |v| DatabaseUrl::from_url_string(&v));

        let sweep_hour = match env::var(env_config::SWEEP_HOUR) {
            Ok(value) => {
                let hour = value
                    .parse::<u8>()
                    .with_context(|| format!("Invalid {}: {value}", env_config::SWEEP_HOUR))?;
                anyhow::ensure!(hour < 24, "{} must be 0-23, got {hour}", env_config::SWEEP_HOUR);
                hour
            }
            Err(_) => defaults::SWEEP_HOUR,
        };

        Ok(Self {
            http_port,
            environment,
            database: DatabaseConfig { url },
            scheduler: SchedulerConfig {
                sweep_hour,
                ..SchedulerConfig::default()
            },
        })
    }

    /// One-line summary for startup logging
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "http_port={} environment={} database={} sweep_hour={:02}:00Z",
            self.http_port,
            self.environment,
            self.database.url.to_connection_string(),
            self.scheduler.sweep_hour
        )
    }
}
