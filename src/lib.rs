//! Stay Rental booking backend.

pub mod booking;
pub mod cache;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::cache::AppCache;
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub config: Arc<Config>,
}

/// Build the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/api/cache/stats", get(routes::cache_stats))
        .route(
            "/api/cache/properties/:id/invalidate",
            post(routes::invalidate_property),
        )
        .merge(booking::router())
        .merge(booking::calculator_router(state.config.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
