use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use health_calendar_api::api::handlers::health::initialize_server_start_time;
use health_calendar_api::api::{create_app, AppState};
use health_calendar_api::config::AppConfig;
use health_calendar_api::telemetry::init_tracing;
use health_calendar_domain::auth::token::TokenService;
use health_calendar_domain::database::{get_connection_info, initialize_database_pool};
use health_calendar_domain::services::GuidelineCatalog;

/// The main entry point for the Health Calendar API server
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Sets up tracing for logging
/// 3. Ensures the data directory exists
/// 4. Opens storage and loads the guideline reference data
/// 5. Creates and starts the Axum web application
/// 6. Handles graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    init_tracing();

    info!("🚀 Starting Health Calendar API server");

    let config = AppConfig::from_env().context("invalid configuration")?;
    let jwt = AppConfig::jwt().context("invalid JWT configuration")?;

    if !config.data_dir.exists() {
        info!("Creating data directory: {}", config.data_dir.display());
        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("failed to create data directory {}", config.data_dir.display()))?;
    }

    let pool = initialize_database_pool(&config.database).context("failed to initialize database")?;
    match &pool {
        Some(pool) => match get_connection_info(pool) {
            Ok(details) => info!("Database ready: {}", details),
            Err(e) => error!("Database connection check failed: {}", e),
        },
        None => info!("Using in-memory storage; records are lost on shutdown"),
    }

    let today = Utc::now().date_naive();
    let catalog = GuidelineCatalog::load(&config.guidelines_path, today)
        .with_context(|| format!("failed to load guidelines from {}", config.guidelines_path.display()))?;
    info!("{} screening guidelines available", catalog.guidelines().len());

    let state = AppState::new(pool, Arc::new(catalog), Arc::new(TokenService::new(jwt)));

    // Uptime in health checks counts from here
    initialize_server_start_time();

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {} ({})", addr, config.app_env);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on CTRL+C, or SIGTERM on Unix systems
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
