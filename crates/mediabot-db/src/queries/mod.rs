//! Database query modules.
//!
//! - result_cache: memoized lookup results with expiry
//! - rate_windows: atomic fixed-window counters

pub mod rate_windows;
pub mod result_cache;
