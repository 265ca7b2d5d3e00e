pub mod config;
pub mod controllers;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use database::executor::{QueryExecutor, RetryPolicy};

// Shared state for every request handler
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub executor: QueryExecutor,
    pub config: config::Config,
    pub started_at: Instant,
}

impl AppState {
    /// Builds the pool and the executor on top of it. No connection is opened here.
    pub fn new(config: config::Config) -> Arc<Self> {
        let db = database::Database::connect_lazy(&config.database);
        let executor = QueryExecutor::new(db.pool.clone(), RetryPolicy::from(&config.retry));

        Arc::new(Self {
            db,
            executor,
            config,
            started_at: Instant::now(),
        })
    }
}

/// The full HTTP surface: `/health`, everything under `/api`, a JSON 404
/// for unknown routes, permissive CORS and request tracing.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(controllers::health::health))
        .nest("/api", controllers::routes())
        .fallback(controllers::fallback)
        .with_state(state)
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
}
