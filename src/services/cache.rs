use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::models::LocationRecord;
use crate::services::catalog::CatalogError;

/// Shared, immutable list of location ranges
pub type LocationSnapshot = Arc<Vec<LocationRecord>>;

/// In-memory TTL cache for location snapshots
///
/// Nearby searches run over every location; reloading them per request is
/// the dominant cost, so a snapshot is reused until it expires. Concurrent
/// misses for the same key share a single load.
pub struct CacheManager {
    snapshots: moka::future::Cache<String, LocationSnapshot>,
}

impl CacheManager {
    pub fn new(max_capacity: u64, ttl_secs: u64) -> Self {
        let snapshots = moka::future::CacheBuilder::new(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { snapshots }
    }

    /// Return the cached snapshot for `key`, loading it on a miss
    ///
    /// Load failures are not cached.
    pub async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> Result<LocationSnapshot, Arc<CatalogError>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<LocationRecord>, CatalogError>>,
    {
        if let Some(snapshot) = self.snapshots.get(key).await {
            tracing::trace!("Cache hit: {}", key);
            return Ok(snapshot);
        }

        tracing::trace!("Cache miss: {}", key);
        self.snapshots
            .try_get_with(key.to_string(), async move { load().await.map(Arc::new) })
            .await
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for the species location snapshot
    pub fn species_locations() -> String {
        "locations:species".to_string()
    }
}
