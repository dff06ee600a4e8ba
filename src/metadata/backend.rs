//! Storage backends for the result cache and the rate limiter.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use mediabot_common::Clock;
use mediabot_db::pool::init_pool;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::cache::{MemoryCache, ResultCache, SqliteCache};
use super::fetcher::Fetcher;
use super::rate_limit::{MemoryRateLimiter, RateBudget, RateLimiter, SqliteRateLimiter};
use super::registry::ProviderRegistry;
use crate::config::{CacheBackend, Config};
use crate::monitor::PerformanceMonitor;

/// Cache and limiter sharing one backend.
#[derive(Clone)]
pub struct Backends {
    pub cache: Arc<dyn ResultCache>,
    pub limiter: Arc<dyn RateLimiter>,
}

impl Backends {
    pub fn from_config(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let budgets = RateBudget::from_config(&config.services);

        match config.cache.backend {
            CacheBackend::Memory => {
                debug!("Using in-memory cache and rate limiter");
                Ok(Self {
                    cache: Arc::new(MemoryCache::new(clock.clone())),
                    limiter: Arc::new(MemoryRateLimiter::new(budgets, clock)),
                })
            }
            CacheBackend::Sqlite => {
                let path = shellexpand::tilde(&config.cache.path.to_string_lossy()).into_owned();
                info!(path = %path, "Opening SQLite cache");
                let pool = init_pool(&path)
                    .with_context(|| format!("Failed to open cache database: {path}"))?;
                Ok(Self {
                    cache: Arc::new(SqliteCache::new(pool.clone(), clock.clone())),
                    limiter: Arc::new(SqliteRateLimiter::new(pool, budgets, clock)),
                })
            }
        }
    }

    /// Build a fetcher over these backends using the configured providers
    /// and TTL.
    pub fn fetcher(&self, config: &Config, monitor: Arc<PerformanceMonitor>) -> Result<Fetcher> {
        let registry = ProviderRegistry::from_config(&config.services)
            .context("Failed to create catalog providers")?;

        Ok(Fetcher::new(
            registry,
            self.cache.clone(),
            self.limiter.clone(),
            monitor,
        )
        .with_ttl(config.cache.ttl()))
    }
}

/// Periodically drop expired cache entries.
pub fn start_purge_task(cache: Arc<dyn ResultCache>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            match cache.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "Purged expired cache entries"),
                Err(e) => warn!(error = %e, "Cache purge failed"),
            }
        }
    })
}
