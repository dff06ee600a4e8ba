//! Mediabot-DB: SQLite storage for state shared between processes
//!
//! Two tables back the pipeline's shared mutable state when more than one
//! process serves the same forum:
//!
//! - `result_cache` - memoized catalog lookups with an absolute expiry
//! - `rate_windows` - per-service request counters for fixed windows
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rows returned by queries
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use mediabot_db::pool::{init_pool, get_conn};
//! use mediabot_db::queries::result_cache;
//!
//! let pool = init_pool("/var/lib/mediabot/state.sqlite").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let removed = result_cache::purge_expired(&conn, chrono::Utc::now().timestamp()).unwrap();
//! println!("Purged {removed} expired entries");
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
