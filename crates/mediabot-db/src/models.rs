//! Rows returned by queries.
//!
//! Timestamps are stored as Unix seconds so expiry comparisons happen inside
//! SQLite.

use serde::{Deserialize, Serialize};

/// A cached lookup result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRow {
    pub cache_key: String,
    /// JSON-encoded media record.
    pub payload: String,
    pub stored_at: i64,
    pub expires_at: i64,
}

/// Request counter for one service's current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindowRow {
    pub window_start: i64,
    pub count: u32,
}

/// Result of an atomic increment-and-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The call was counted. `remaining` calls are left in this window.
    Allowed { remaining: u32 },
    /// Budget exhausted; the window rolls over in `retry_after_secs`.
    Denied { retry_after_secs: i64 },
}
