// ABOUTME: Logging configuration and structured logging setup for observability
// ABOUTME: Configures log levels, formatters, and output destinations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! Production-ready logging configuration with structured output

use crate::constants::{env_config, service_names};
use anyhow::Result;
use std::env;
use tracing::info;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Include source file and line numbers
    pub include_location: bool,
    /// Service name for structured logging
    pub service_name: String,
    /// Service version
    pub service_version: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

/// Log output format options
#[derive(Debug, Clone)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            service_name: service_names::REHAB_TRACKER.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var(env_config::RUST_LOG).unwrap_or_else(|_| "info".into());

        let format = match env::var(env_config::LOG_FORMAT).as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };

        let environment =
            env::var(env_config::ENVIRONMENT).unwrap_or_else(|_| "development".into());

        let include_location = env::var("LOG_INCLUDE_LOCATION")
            .map(|v| v == "true")
            .unwrap_or(false);

        Self {
            level,
            format,
            include_location,
            environment,
            ..Self::default()
        }
    }

    /// Initialize the global tracing subscriber with this configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed or the
    /// level filter cannot be parsed
    pub fn init(&self) -> Result<()> {
        let filter = EnvFilter::try_new(&self.level)
            .or_else(|_| EnvFilter::try_new("info"))
            .map_err(|e| anyhow::anyhow!("Failed to build log filter: {e}"))?;

        match self.format {
            LogFormat::Json => {
                let layer = fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_file(self.include_location)
                    .with_line_number(self.include_location);
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .try_init()?;
            }
            LogFormat::Pretty => {
                let layer = fmt::layer()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location);
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .try_init()?;
            }
            LogFormat::Compact => {
                let layer = fmt::layer()
                    .compact()
                    .with_file(self.include_location)
                    .with_line_number(self.include_location);
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer)
                    .try_init()?;
            }
        }

        info!(
            service = %self.service_name,
            version = %self.service_version,
            environment = %self.environment,
            "Logging initialized"
        );

        Ok(())
    }
}

/// Initialize logging from environment variables
///
/// # Errors
///
/// Returns an error if the subscriber cannot be installed
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}
