//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::scraping::jobs::ScrapeWorkerPool;
use crate::kernel::ServerDeps;
use crate::server::routes::{
    cancel_job_handler, get_job_handler, health_handler, list_jobs_handler, list_stats_handler,
    run_all_handler, run_sport_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub server_deps: Arc<ServerDeps>,
    pub worker_pool: Arc<ScrapeWorkerPool>,
}

impl AppState {
    pub fn new(server_deps: ServerDeps, worker_pool: Arc<ScrapeWorkerPool>) -> Self {
        Self {
            db_pool: server_deps.db_pool.clone(),
            server_deps: Arc::new(server_deps),
            worker_pool,
        }
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - allow any origin, no credentials
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        // Scrape triggers
        .route("/api/scrape/run", post(run_all_handler))
        .route("/api/scrape/ncaa/:sport", post(run_sport_handler))
        // Job tracking
        .route("/api/scrape/jobs", get(list_jobs_handler))
        .route("/api/scrape/jobs/:id", get(get_job_handler))
        .route("/api/scrape/jobs/:id/cancel", post(cancel_job_handler))
        // Downstream reads
        .route("/api/stats/:sport", get(list_stats_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
