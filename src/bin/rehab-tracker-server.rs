// ABOUTME: Server binary wiring configuration, database, scheduler, and HTTP routes
// ABOUTME: Production entry point for the rehab-tracker backend
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Rehab Tracker Contributors

//! # Rehab Tracker Server Binary
//!
//! Starts the HTTP API, runs database migrations, and spawns the streak
//! maintenance scheduler.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rehab_tracker::{
    config::environment::{DatabaseUrl, ServerConfig},
    context::ServerResources,
    database::Database,
    logging, routes,
    services::StreakScheduler,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "rehab-tracker-server")]
#[command(about = "Rehab Tracker - daily activity aggregation and streak tracking API")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(url) = args.database_url.as_deref() {
        config.database.url = DatabaseUrl::from_url_string(url);
    }

    logging::init_from_env()?;

    info!("Starting Rehab Tracker");
    info!("{}", config.summary());

    if let DatabaseUrl::SQLite { path } = &config.database.url {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    let database = Database::new(&config.database.url.to_connection_string()).await?;
    info!("Database initialized and migrated");

    let resources = Arc::new(ServerResources::new(database, config.clone()));

    let scheduler = Arc::new(StreakScheduler::new(
        config.scheduler.clone(),
        Arc::clone(&resources.streak_service),
    ));
    scheduler.start();

    let app = routes::router(Arc::clone(&resources));

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install shutdown handler");
    }
}
