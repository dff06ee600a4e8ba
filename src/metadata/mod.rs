//! Catalog lookups: normalized records, provider adapters, caching and rate
//! limiting.
//!
//! # Module layout
//!
//! - [`record`] -- [`MediaRecord`] and the kind-agnostic [`RecordView`].
//! - [`provider`] -- The [`CatalogProvider`] adapter trait.
//! - [`providers`] -- TMDB (movies) and TVDB (series) adapters.
//! - [`registry`] -- Routes a media type to its provider.
//! - [`cache`] -- [`ResultCache`] with memory and SQLite backends.
//! - [`rate_limit`] -- [`RateLimiter`] with memory and SQLite backends.
//! - [`fetcher`] -- [`Fetcher`], which ties the above together.
//! - [`backend`] -- Builds the cache and limiter for the configured backend.

pub mod backend;
pub mod cache;
pub mod fetcher;
pub mod provider;
pub mod providers;
pub mod rate_limit;
pub mod record;
pub mod registry;

pub use backend::{start_purge_task, Backends};
pub use cache::{CacheKey, MemoryCache, ResultCache, SqliteCache};
pub use fetcher::{Fetcher, DEFAULT_TTL};
pub use provider::CatalogProvider;
pub use rate_limit::{
    Acquire, MemoryRateLimiter, RateBudget, RateLimiter, RateWindow, SqliteRateLimiter,
};
pub use record::{CastMember, MediaRecord, MovieRecord, RecordView, ShowRecord};
pub use registry::ProviderRegistry;
