// ABOUTME: Server binary for the FitCoach trainer and client coaching API
// ABOUTME: Loads configuration, opens the database and serves the HTTP routes until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # FitCoach API Server Binary
//!
//! Starts the HTTP API on the configured host and port. Environment variables
//! configure everything; a couple of command-line flags override them.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fitcoach_server::{
    config::ServerConfig, database::Database, logging, resources::ServerResources,
    routes::build_router,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "fitcoach-server")]
#[command(about = "FitCoach API - trainer and client coaching backend")]
pub struct Args {
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
        config.http.port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database.url = database_url;
    }

    logging::init_from_env()?;
    info!("{}", config.summary());
    if config.nutrition.api_key.is_none() {
        warn!("NUTRITION_API_KEY is not set; nutrition estimation will answer not_configured");
    }

    let database = Database::new(&config.database.url, config.database.max_connections).await?;

    let address = format!("{}:{}", config.http.host, config.http.port);
    let config = Arc::new(config);
    let resources = Arc::new(ServerResources::with_vision_client(database, config)?);
    let app = build_router(resources);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
