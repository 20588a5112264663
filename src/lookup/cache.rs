//! Optional response cache in front of a lookup service.
//!
//! Successful results are kept per [`LookupQuery`] (customer, model and date
//! range) until the TTL expires. Failures are never stored, so a field that
//! showed "Failed to load ..." retries against the service when re-triggered.

use futures::future::BoxFuture;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::error::LookupError;
use crate::lookup::LookupService;
use crate::lookup::models::{LookupQuery, LookupResult};

pub struct CachedLookup<S: ?Sized> {
    inner: Arc<S>,
    cache: Cache<LookupQuery, LookupResult>,
}

impl<S: LookupService + ?Sized> CachedLookup<S> {
    #[must_use]
    pub fn new(inner: Arc<S>, ttl: Duration, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self { inner, cache }
    }

    /// Serve from cache, or call the inner service and remember a success.
    ///
    /// # Errors
    ///
    /// Propagates the inner service's `LookupError` on a cache miss.
    pub async fn get_or_fetch(&self, query: &LookupQuery) -> Result<LookupResult, LookupError> {
        if let Some(hit) = self.cache.get(query).await {
            tracing::debug!(customer = %query.customer, model = ?query.model, "cache_hit");
            return Ok(hit);
        }

        let result = self.inner.lookup(query).await?;
        self.cache.insert(query.clone(), result.clone()).await;
        tracing::debug!(customer = %query.customer, model = ?query.model, "cache_stored");
        Ok(result)
    }

    /// Drop every cached result.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
        tracing::debug!("cache_invalidated");
    }
}

impl<S: LookupService + ?Sized> LookupService for CachedLookup<S> {
    fn lookup<'a>(
        &'a self,
        query: &'a LookupQuery,
    ) -> BoxFuture<'a, Result<LookupResult, LookupError>> {
        Box::pin(self.get_or_fetch(query))
    }
}
