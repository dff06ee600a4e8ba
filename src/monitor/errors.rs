//! Bounded log of recent lookup errors for operators.
//!
//! Entries go into one bucket per UTC day, newest first. Each bucket holds at
//! most [`BUCKET_CAPACITY`] entries and buckets older than the retention
//! window are dropped on write.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use mediabot_common::{Clock, Error, ErrorKind};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::reply::Messages;

/// Maximum entries kept per daily bucket.
pub const BUCKET_CAPACITY: usize = 1000;

const RETENTION_DAYS: i64 = 7;

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ErrorLog {
    buckets: Mutex<BTreeMap<NaiveDate, VecDeque<ErrorRecord>>>,
    clock: Arc<dyn Clock>,
}

impl ErrorLog {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: Mutex::new(BTreeMap::new()),
            clock,
        }
    }

    /// Log and store `error`, returning the message to show a user in
    /// `locale`.
    pub fn record(
        &self,
        error: &Error,
        context: BTreeMap<String, String>,
        locale: &str,
    ) -> String {
        match error {
            Error::RateLimit { .. } => warn!(kind = %error.kind(), context = ?context, "{}", error),
            _ => error!(kind = %error.kind(), context = ?context, "{}", error),
        }

        self.push(ErrorRecord {
            kind: error.kind(),
            message: error.to_string(),
            context,
            timestamp: self.clock.now(),
        });

        user_message(error, locale)
    }

    /// Store a record in its day's bucket.
    pub fn push(&self, record: ErrorRecord) {
        let day = record.timestamp.date_naive();
        let cutoff = (self.clock.now() - Duration::days(RETENTION_DAYS)).date_naive();

        let mut buckets = self.buckets.lock();
        buckets.retain(|bucket_day, _| *bucket_day > cutoff);

        let bucket = buckets.entry(day).or_default();
        bucket.push_front(record);
        bucket.truncate(BUCKET_CAPACITY);
    }

    /// Up to `limit` most recent errors, newest first.
    pub fn recent(&self, limit: usize) -> Vec<ErrorRecord> {
        let buckets = self.buckets.lock();
        buckets
            .values()
            .rev()
            .flat_map(|bucket| bucket.iter())
            .take(limit)
            .cloned()
            .collect()
    }

    /// Remove every stored error. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut buckets = self.buckets.lock();
        let removed = buckets.values().map(VecDeque::len).sum();
        buckets.clear();
        removed
    }
}

/// Localized, user-facing description of `error`.
pub fn user_message(error: &Error, locale: &str) -> String {
    let messages = Messages::for_locale(locale);
    let template = match error.kind() {
        ErrorKind::Api => messages.error_api,
        ErrorKind::RateLimit => messages.error_rate_limit,
        ErrorKind::Configuration => messages.error_configuration,
        ErrorKind::Validation => messages.error_validation,
        ErrorKind::Cache => messages.error_generic,
    };
    Messages::fill(template, &error.to_string())
}

/// Build an error context map from key/value pairs.
pub fn context<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
