//! Memoization of catalog lookups.
//!
//! A [`ResultCache`] maps a [`CacheKey`] to the exact [`MediaRecord`] stored
//! under it until its TTL runs out. `put` always replaces the whole entry.
//! Two backends are provided: [`MemoryCache`] for a single process and
//! [`SqliteCache`] for processes sharing one database file.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mediabot_common::{Clock, Error, LookupRequest, Result, Service};
use mediabot_db::pool::{get_conn, DbPool};
use mediabot_db::queries::result_cache;

use super::record::MediaRecord;

/// Deterministic key for one logical lookup:
/// `{service}:{case-folded, trimmed title}:{locale}`.
///
/// The year hint is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(service: Service, title: &str, locale: &str) -> Self {
        Self(format!(
            "{}:{}:{}",
            service,
            title.trim().to_lowercase(),
            locale.trim()
        ))
    }

    pub fn for_request(request: &LookupRequest) -> Self {
        Self::new(request.service(), &request.title, &request.locale)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait ResultCache: Send + Sync {
    /// The live record stored under `key`, if any.
    async fn get(&self, key: &CacheKey) -> Result<Option<MediaRecord>>;

    /// Store `record` under `key` for `ttl`, replacing any previous entry.
    async fn put(&self, key: &CacheKey, record: &MediaRecord, ttl: Duration) -> Result<()>;

    /// Remove expired entries. Returns how many were removed.
    async fn purge_expired(&self) -> Result<usize>;

    /// Remove every entry. Returns how many were removed.
    async fn clear(&self) -> Result<usize>;
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| Error::cache(format!("TTL out of range: {ttl:?}")))
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct CacheEntry {
    record: MediaRecord,
    expires_at: DateTime<Utc>,
}

/// Process-local cache backed by a concurrent map.
#[derive(Debug)]
pub struct MemoryCache {
    entries: DashMap<CacheKey, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<MediaRecord>> {
        let now = self.clock.now();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.record.clone()))
    }

    async fn put(&self, key: &CacheKey, record: &MediaRecord, ttl: Duration) -> Result<()> {
        let expires_at = expiry(self.clock.now(), ttl)?;
        self.entries.insert(
            key.clone(),
            CacheEntry {
                record: record.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        Ok(before.saturating_sub(self.entries.len()))
    }

    async fn clear(&self) -> Result<usize> {
        let removed = self.entries.len();
        self.entries.clear();
        Ok(removed)
    }
}

// ---------------------------------------------------------------------------
// SQLite backend
// ---------------------------------------------------------------------------

/// Cache stored in the `result_cache` table, shared by every process that
/// opens the same database file. Records are stored as JSON.
#[derive(Debug, Clone)]
pub struct SqliteCache {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl SqliteCache {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&rusqlite::Connection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            f(&*conn)
        })
        .await
        .map_err(|e| Error::cache(format!("spawn_blocking join error: {e}")))?
    }
}

#[async_trait]
impl ResultCache for SqliteCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<MediaRecord>> {
        let key = key.as_str().to_string();
        let now = self.clock.now().timestamp();
        let row = self
            .with_conn(move |conn| result_cache::get(conn, &key, now))
            .await?;

        row.map(|row| {
            serde_json::from_str(&row.payload)
                .map_err(|e| Error::cache(format!("corrupt cache entry {}: {e}", row.cache_key)))
        })
        .transpose()
    }

    async fn put(&self, key: &CacheKey, record: &MediaRecord, ttl: Duration) -> Result<()> {
        let payload = serde_json::to_string(record)
            .map_err(|e| Error::cache(format!("failed to encode cache entry: {e}")))?;
        let now = self.clock.now();
        let expires_at = expiry(now, ttl)?.timestamp();
        let stored_at = now.timestamp();
        let key = key.as_str().to_string();

        self.with_conn(move |conn| result_cache::put(conn, &key, &payload, stored_at, expires_at))
            .await
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = self.clock.now().timestamp();
        self.with_conn(move |conn| result_cache::purge_expired(conn, now))
            .await
    }

    async fn clear(&self) -> Result<usize> {
        self.with_conn(result_cache::clear).await
    }
}
