// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use sportsbot_core::domains::scraping::jobs::start_worker_pool;
use sportsbot_core::domains::scraping::models::ScrapeJob;
use sportsbot_core::kernel::ServerDeps;
use sportsbot_core::server::{build_app, AppState};
use sportsbot_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sportsbot_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting sports stats scrape API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Jobs from a previous process can never finish
    let interrupted = ScrapeJob::fail_interrupted(&pool)
        .await
        .context("Failed to reset interrupted jobs")?;
    if interrupted > 0 {
        tracing::warn!(count = interrupted, "Marked interrupted scrape jobs as failed");
    }

    // Build dependencies and start workers
    let server_deps = ServerDeps::from_config(pool, &config)?;
    let worker_pool = Arc::new(start_worker_pool(server_deps.clone(), config.worker_pool()));

    let app = build_app(AppState::new(server_deps, worker_pool.clone()));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down worker pool");
    worker_pool.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
