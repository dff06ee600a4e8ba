//! Hourly per-service counters for catalog calls and cache effectiveness.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration};
use dashmap::DashMap;
use mediabot_common::{Clock, Service};
use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: i64 = 3600;
const RETENTION_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Seconds spent in upstream calls
    ApiResponseTime,
    CacheHits,
    CacheMisses,
    ErrorCount,
    RequestCount,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::ApiResponseTime,
        Metric::CacheHits,
        Metric::CacheMisses,
        Metric::ErrorCount,
        Metric::RequestCount,
    ];
}

/// Per-metric totals keyed by hour label (`%Y-%m-%d %H:00`).
pub type ServiceMetrics = BTreeMap<Metric, BTreeMap<String, f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BucketKey {
    metric: Metric,
    service: Service,
    /// Hours since the Unix epoch.
    hour: i64,
}

#[derive(Debug)]
pub struct PerformanceMonitor {
    buckets: DashMap<BucketKey, f64>,
    clock: Arc<dyn Clock>,
}

impl PerformanceMonitor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: DashMap::new(),
            clock,
        }
    }

    /// Add `value` to the current hour's bucket for `metric`.
    pub fn record(&self, metric: Metric, service: Service, value: f64) {
        let hour = self.current_hour();
        *self
            .buckets
            .entry(BucketKey {
                metric,
                service,
                hour,
            })
            .or_insert(0.0) += value;

        let oldest = hour - RETENTION_DAYS * 24;
        self.buckets.retain(|key, _| key.hour > oldest);
    }

    /// Record one upstream call and how long it took.
    pub fn record_api_call(&self, service: Service, elapsed: StdDuration, succeeded: bool) {
        self.record(Metric::ApiResponseTime, service, elapsed.as_secs_f64());
        self.record(Metric::RequestCount, service, 1.0);
        if !succeeded {
            self.record(Metric::ErrorCount, service, 1.0);
        }
    }

    pub fn cache_hit(&self, service: Service) {
        self.record(Metric::CacheHits, service, 1.0);
    }

    pub fn cache_miss(&self, service: Service) {
        self.record(Metric::CacheMisses, service, 1.0);
    }

    /// Totals for `service` over the trailing `range`, grouped by hour.
    /// Every metric is present, possibly with no hours.
    pub fn metrics(&self, service: Service, range: Duration) -> ServiceMetrics {
        let now = self.current_hour();
        let start = now - range.num_hours();

        let mut result: ServiceMetrics = Metric::ALL
            .iter()
            .map(|m| (*m, BTreeMap::new()))
            .collect();

        for entry in self.buckets.iter() {
            let key = entry.key();
            if key.service != service || key.hour < start || key.hour > now {
                continue;
            }
            if let Some(label) = hour_label(key.hour) {
                *result
                    .entry(key.metric)
                    .or_default()
                    .entry(label)
                    .or_insert(0.0) += *entry.value();
            }
        }

        result
    }

    /// Drop every bucket.
    pub fn clear(&self) {
        self.buckets.clear();
    }

    fn current_hour(&self) -> i64 {
        self.clock.now().timestamp().div_euclid(SECONDS_PER_HOUR)
    }
}

fn hour_label(hour: i64) -> Option<String> {
    DateTime::from_timestamp(hour * SECONDS_PER_HOUR, 0)
        .map(|t| t.format("%Y-%m-%d %H:00").to_string())
}
