//! Webhook Route Configuration

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};
use super::middleware::logging_middleware;

/// Maximum alerts processed at once
const MAX_CONCURRENT_REQUESTS: usize = 64;

/// Create the webhook router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Zabbix media script target
        .route("/alert", post(handlers::alert))
        .route("/health", get(handlers::health_check))
        .with_state(state)
        // Middleware (order matters - bottom runs first)
        .layer(TraceLayer::new_for_http())
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(middleware::from_fn(logging_middleware))
}
