//! In-memory caching using moka
//!
//! Caches property pricing records. Rates and fee policies change rarely, and
//! a booking always re-reads the property inside its transaction, so a stale
//! entry can only ever affect a quote.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};
use uuid::Uuid;

use crate::booking::models::Property;
use crate::booking::queries;

/// Application cache holding property records
#[derive(Clone)]
pub struct AppCache {
    /// Properties (id -> Property)
    pub properties: Cache<Uuid, Arc<Property>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Properties: 1000 entries, 15 min TTL, 5 min idle
            properties: Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(15 * 60))
                .time_to_idle(Duration::from_secs(5 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            properties_size: self.properties.entry_count(),
        }
    }

    /// Invalidate a single property
    pub async fn invalidate_property(&self, property_id: Uuid) {
        self.properties.invalidate(&property_id).await;
        info!("Cache invalidated for property: {}", property_id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub properties_size: u64,
}

/// Start background cache warmer
///
/// Warms the cache on startup and refreshes every 10 minutes.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool) {
    let mut interval = interval(Duration::from_secs(10 * 60));
    loop {
        // First tick fires immediately
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

/// Load every bookable property into the cache
async fn warm_cache(cache: &AppCache, db: &PgPool) {
    info!("Starting cache warm-up...");

    match queries::get_active_properties(db).await {
        Ok(properties) => {
            for property in properties {
                cache.properties.insert(property.id, Arc::new(property)).await;
            }
        }
        Err(e) => warn!("Failed to warm property cache: {}", e),
    }

    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}
