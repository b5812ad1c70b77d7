//! Operational route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::cache::CacheStats;
use crate::AppState;

/// Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Cache statistics for monitoring
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

/// Drop a property from the cache after its rates change upstream
pub async fn invalidate_property(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
) -> StatusCode {
    state.cache.invalidate_property(property_id).await;
    StatusCode::NO_CONTENT
}
