//! Per-service fixed-window request budgets.
//!
//! Every service has a budget of calls per window. `try_acquire` resets an
//! expired window, then counts the call if the budget allows it. The check
//! and the increment happen under one lock (memory) or one `BEGIN IMMEDIATE`
//! transaction (SQLite), so concurrent callers cannot overshoot the budget.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mediabot_common::{Clock, Error, Result, Service};
use mediabot_db::models::AcquireOutcome;
use mediabot_db::pool::{get_conn, DbPool};
use mediabot_db::queries::rate_windows;

use crate::config::ServicesConfig;

/// Calls allowed per window for one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateBudget {
    pub budget: u32,
    pub window: Duration,
}

impl RateBudget {
    pub fn new(budget: u32, window: Duration) -> Self {
        Self { budget, window }
    }

    /// Budgets for every service, as configured.
    pub fn from_config(services: &ServicesConfig) -> HashMap<Service, RateBudget> {
        Service::ALL
            .iter()
            .map(|service| {
                let settings = services.resolve(*service);
                (*service, RateBudget::new(settings.budget, settings.window))
            })
            .collect()
    }
}

/// Outcome of one acquire attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    Allowed { remaining: u32 },
    Denied { retry_after: Duration },
}

impl Acquire {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Acquire::Allowed { .. })
    }
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Count one call against `service` if its budget allows it.
    async fn try_acquire(&self, service: Service) -> Result<Acquire>;

    /// Forget the current window for `service`.
    async fn reset(&self, service: Service) -> Result<()>;
}

fn budget_for(budgets: &HashMap<Service, RateBudget>, service: Service) -> Result<RateBudget> {
    budgets
        .get(&service)
        .copied()
        .ok_or_else(|| Error::configuration(format!("No rate budget configured for {service}")))
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Counter and start time of a service's current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub start: DateTime<Utc>,
    pub count: u32,
}

#[derive(Debug)]
pub struct MemoryRateLimiter {
    budgets: HashMap<Service, RateBudget>,
    windows: DashMap<Service, RateWindow>,
    clock: Arc<dyn Clock>,
}

impl MemoryRateLimiter {
    pub fn new(budgets: HashMap<Service, RateBudget>, clock: Arc<dyn Clock>) -> Self {
        Self {
            budgets,
            windows: DashMap::new(),
            clock,
        }
    }

    /// Snapshot of the current window for `service`.
    pub fn window(&self, service: Service) -> Option<RateWindow> {
        self.windows.get(&service).map(|w| *w)
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn try_acquire(&self, service: Service) -> Result<Acquire> {
        let budget = budget_for(&self.budgets, service)?;
        let window_len = chrono::Duration::from_std(budget.window)
            .map_err(|e| Error::configuration(format!("invalid window for {service}: {e}")))?;
        let now = self.clock.now();

        // The entry guard holds the shard lock for the whole check-and-count.
        let mut window = self.windows.entry(service).or_insert(RateWindow {
            start: now,
            count: 0,
        });

        if now - window.start >= window_len {
            *window = RateWindow {
                start: now,
                count: 0,
            };
        }

        if window.count < budget.budget {
            window.count += 1;
            Ok(Acquire::Allowed {
                remaining: budget.budget - window.count,
            })
        } else {
            let retry_after = (window.start + window_len - now)
                .to_std()
                .unwrap_or(Duration::ZERO);
            Ok(Acquire::Denied { retry_after })
        }
    }

    async fn reset(&self, service: Service) -> Result<()> {
        self.windows.remove(&service);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SQLite backend
// ---------------------------------------------------------------------------

/// Limiter whose windows live in the `rate_windows` table, so every process
/// sharing the database draws from the same budget.
#[derive(Debug, Clone)]
pub struct SqliteRateLimiter {
    pool: DbPool,
    budgets: HashMap<Service, RateBudget>,
    clock: Arc<dyn Clock>,
}

impl SqliteRateLimiter {
    pub fn new(pool: DbPool, budgets: HashMap<Service, RateBudget>, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            budgets,
            clock,
        }
    }
}

#[async_trait]
impl RateLimiter for SqliteRateLimiter {
    async fn try_acquire(&self, service: Service) -> Result<Acquire> {
        let budget = budget_for(&self.budgets, service)?;
        let window_secs = i64::try_from(budget.window.as_secs())
            .map_err(|_| Error::configuration(format!("window for {service} is too long")))?;
        let now = self.clock.now().timestamp();
        let pool = self.pool.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let mut conn = get_conn(&pool)?;
            rate_windows::try_acquire(&mut conn, service.as_str(), budget.budget, window_secs, now)
        })
        .await
        .map_err(|e| Error::cache(format!("spawn_blocking join error: {e}")))??;

        Ok(match outcome {
            AcquireOutcome::Allowed { remaining } => Acquire::Allowed { remaining },
            AcquireOutcome::Denied { retry_after_secs } => Acquire::Denied {
                retry_after: Duration::from_secs(retry_after_secs.max(0) as u64),
            },
        })
    }

    async fn reset(&self, service: Service) -> Result<()> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = get_conn(&pool)?;
            rate_windows::reset(&conn, service.as_str()).map(|_| ())
        })
        .await
        .map_err(|e| Error::cache(format!("spawn_blocking join error: {e}")))?
    }
}
