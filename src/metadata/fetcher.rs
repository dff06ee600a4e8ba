//! Cache-aware, rate-limited catalog lookups.
//!
//! [`Fetcher::fetch`] resolves one [`LookupRequest`]:
//!
//! 1. route to the provider for the request's media type
//! 2. return a cached record if one is live (no budget charged)
//! 3. take one unit of the service's rate budget, or fail with
//!    [`Error::RateLimit`] before any network I/O
//! 4. search, fetch detail, normalize
//! 5. cache the record
//!
//! A search with no results yields `Ok(None)` and is not cached. Cache
//! failures are logged and never fail an otherwise successful lookup.

use std::sync::Arc;
use std::time::{Duration, Instant};

use mediabot_common::{Error, LookupRequest, Result};
use tracing::{debug, info, warn};

use super::cache::{CacheKey, ResultCache};
use super::provider::CatalogProvider;
use super::rate_limit::{Acquire, RateLimiter};
use super::record::MediaRecord;
use super::registry::ProviderRegistry;
use crate::monitor::PerformanceMonitor;

/// Default lifetime of a cached record.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct Fetcher {
    registry: ProviderRegistry,
    cache: Arc<dyn ResultCache>,
    limiter: Arc<dyn RateLimiter>,
    monitor: Arc<PerformanceMonitor>,
    ttl: Duration,
}

impl Fetcher {
    pub fn new(
        registry: ProviderRegistry,
        cache: Arc<dyn ResultCache>,
        limiter: Arc<dyn RateLimiter>,
        monitor: Arc<PerformanceMonitor>,
    ) -> Self {
        Self {
            registry,
            cache,
            limiter,
            monitor,
            ttl: DEFAULT_TTL,
        }
    }

    /// Override the cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<dyn ResultCache> {
        &self.cache
    }

    /// Resolve `request` to a record, or `None` when the catalog has no
    /// match.
    pub async fn fetch(&self, request: &LookupRequest) -> Result<Option<MediaRecord>> {
        if request.title.trim().is_empty() {
            return Err(Error::validation("Title must not be blank"));
        }

        let provider = self.registry.for_media_type(request.media_type).ok_or_else(|| {
            Error::configuration(format!(
                "No catalog provider registered for {}",
                request.media_type
            ))
        })?;
        let service = provider.service();
        if !provider.is_available() {
            return Err(Error::configuration(format!(
                "No API key configured for {service}"
            )));
        }

        let key = CacheKey::for_request(request);
        match self.cache.get(&key).await {
            Ok(Some(record)) => {
                debug!(key = %key, "Cache hit");
                self.monitor.cache_hit(service);
                return Ok(Some(record));
            }
            Ok(None) => self.monitor.cache_miss(service),
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                self.monitor.cache_miss(service);
            }
        }

        if let Acquire::Denied { retry_after } = self.limiter.try_acquire(service).await? {
            warn!(
                service = %service,
                retry_after_secs = retry_after.as_secs(),
                "Rate limit exhausted"
            );
            return Err(Error::rate_limit(service.as_str(), retry_after));
        }

        let started = Instant::now();
        let result = self.lookup(provider.as_ref(), request).await;
        self.monitor
            .record_api_call(service, started.elapsed(), result.is_ok());

        let record = match result? {
            Some(record) => record,
            None => {
                info!(service = %service, title = %request.title, "No catalog match");
                return Ok(None);
            }
        };

        if let Err(e) = self.cache.put(&key, &record, self.ttl).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }

        info!(
            service = %service,
            title = %record.title(),
            "Fetched catalog record"
        );
        Ok(Some(record))
    }

    async fn lookup(
        &self,
        provider: &dyn CatalogProvider,
        request: &LookupRequest,
    ) -> Result<Option<MediaRecord>> {
        let Some(id) = provider
            .search(&request.title, request.year, &request.locale)
            .await?
        else {
            return Ok(None);
        };

        let detail = provider.fetch_detail(&id, &request.locale).await?;
        provider.normalize(detail).map(Some)
    }
}
