//! Caching layer for course routes.
//!
//! Geocoding a course is slow on the backend and a route only changes when
//! its course does, so routes are cached per course id and dropped whenever
//! the course is replaced or deleted through this client.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::api::{ApiClient, ApiError, Route};
use crate::domain::Course;

/// Configuration for the route cache.
#[derive(Debug, Clone)]
pub struct RouteCacheConfig {
    /// TTL for cached routes.
    pub ttl: Duration,

    /// Maximum number of cached routes.
    pub max_capacity: u64,
}

impl Default for RouteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            max_capacity: 256,
        }
    }
}

/// API client that caches course routes.
#[derive(Clone)]
pub struct CachedApiClient {
    client: ApiClient,
    routes: MokaCache<String, Arc<Route>>,
}

impl CachedApiClient {
    pub fn new(client: ApiClient, config: &RouteCacheConfig) -> Self {
        let routes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        Self { client, routes }
    }

    /// Route for a course, from cache when available.
    pub async fn route(&self, course_id: &str) -> Result<Arc<Route>, ApiError> {
        if let Some(cached) = self.routes.get(course_id).await {
            debug!(course_id, "route cache hit");
            return Ok(cached);
        }

        debug!(course_id, "route cache miss");
        let route = Arc::new(self.client.route(course_id).await?);
        self.routes
            .insert(course_id.to_string(), route.clone())
            .await;
        Ok(route)
    }

    /// Replace a course and forget its cached route.
    pub async fn replace_course(&self, id: &str, course: &Course) -> Result<Course, ApiError> {
        let saved = self.client.replace_course(id, course).await?;
        self.routes.invalidate(id).await;
        Ok(saved)
    }

    /// Delete a course and forget its cached route.
    pub async fn delete_course(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete_course(id).await?;
        self.routes.invalidate(id).await;
        Ok(())
    }

    /// Access the underlying client for operations that bypass the cache.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Invalidate all cached routes.
    pub fn invalidate_all(&self) {
        self.routes.invalidate_all();
    }
}
