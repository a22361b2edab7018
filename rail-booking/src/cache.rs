//! Caching layer for itinerary searches.
//!
//! The route catalog never changes while the server runs, so a search
//! result depends only on its query. Queries compare locations
//! case-insensitively, so "paris" and "Paris" share an entry.

use std::sync::Arc;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::catalog::RouteCatalog;
use crate::config::CacheConfig;
use crate::planner::{Planner, SearchConfig, SearchError, SearchQuery, SearchResult};

/// Cache of search results keyed by query.
pub struct SearchCache {
    results: MokaCache<SearchQuery, Arc<SearchResult>>,
}

impl SearchCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let results = MokaCache::builder()
            .time_to_live(config.ttl())
            .max_capacity(config.max_capacity)
            .build();

        Self { results }
    }

    pub async fn get(&self, query: &SearchQuery) -> Option<Arc<SearchResult>> {
        self.results.get(query).await
    }

    pub async fn insert(&self, query: SearchQuery, result: Arc<SearchResult>) {
        self.results.insert(query, result).await;
    }

    /// Approximate number of cached entries (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.results.entry_count()
    }

    /// Apply pending inserts and evictions so `entry_count` is exact.
    pub async fn sync(&self) {
        self.results.run_pending_tasks().await;
    }
}

/// Planner over a shared catalog, with cached results.
pub struct CachedPlanner {
    catalog: Arc<RouteCatalog>,
    config: Arc<SearchConfig>,
    cache: SearchCache,
}

impl CachedPlanner {
    pub fn new(
        catalog: Arc<RouteCatalog>,
        config: Arc<SearchConfig>,
        cache_config: &CacheConfig,
    ) -> Self {
        Self {
            catalog,
            config,
            cache: SearchCache::new(cache_config),
        }
    }

    pub fn catalog(&self) -> &RouteCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search, using the cache if available.
    ///
    /// Invalid queries are never cached.
    pub async fn search(&self, query: &SearchQuery) -> Result<Arc<SearchResult>, SearchError> {
        if let Some(cached) = self.cache.get(query).await {
            trace!(origin = %query.origin, destination = %query.destination, "Search cache hit");
            return Ok(cached);
        }

        let planner = Planner::new(&self.catalog, &self.config);
        let result = Arc::new(planner.search(query)?);

        self.cache.insert(query.clone(), Arc::clone(&result)).await;
        Ok(result)
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }
}
