//! Listing API
//!
//! REST gateway and CLI for race and sport listings.

mod cli;
mod config;
mod error;
mod routes;
mod service;
mod storage;
mod types;

use axum::{routing::get, Router};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::service::{RacingService, SportingService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => run_server(host, port).await,
        Commands::List {
            resource,
            meeting_ids,
            only_visible,
            order_by,
            direction,
        } => cli::run_list(
            resource,
            cli::build_filter(meeting_ids, only_visible, order_by, direction),
        ),
        Commands::Fetch { resource, id } => cli::run_fetch(resource, id),
    }
}

/// Run the API gateway.
async fn run_server(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listing_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let mut config = AppConfig::load()?;

    // Override with CLI args
    if let Some(h) = host {
        config.server.host = h;
    }
    if let Some(p) = port {
        config.server.port = p;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("Racing store: {}", config.racing.path);
    tracing::info!("Sports store: {}", config.sports.path);

    // Open and seed both stores; a failed seed is fatal
    let racing: Arc<RacingService> = Arc::new(cli::open_service(&config.racing)?);
    let sports: Arc<SportingService> = Arc::new(cli::open_service(&config.sports)?);
    tracing::info!("Stores initialized");

    // Build router
    let app = Router::new()
        .route("/health", get(routes::health))
        .merge(routes::resource_routes(racing))
        .merge(routes::resource_routes(sports))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
