//! Fixed-window rate counter queries.
//!
//! `try_acquire` reads, resets and increments a service's counter inside one
//! `BEGIN IMMEDIATE` transaction, so concurrent processes cannot both take the
//! last slot of a window.

use mediabot_common::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::models::{AcquireOutcome, RateWindowRow};

/// Count one call against `service` if its budget allows it.
///
/// A window that started `window_secs` or more before `now` is reset first.
pub fn try_acquire(
    conn: &mut Connection,
    service: &str,
    budget: u32,
    window_secs: i64,
    now: i64,
) -> Result<AcquireOutcome> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|e| Error::cache(e.to_string()))?;

    let current = read(&tx, service)?;
    let (window_start, count) = match current {
        Some(row) if now - row.window_start < window_secs => (row.window_start, row.count),
        _ => (now, 0),
    };

    let outcome = if count < budget {
        tx.execute(
            "INSERT INTO rate_windows (service, window_start, count) VALUES (?1, ?2, ?3)
             ON CONFLICT(service) DO UPDATE SET window_start = excluded.window_start,
                                                count = excluded.count",
            params![service, window_start, count + 1],
        )
        .map_err(|e| Error::cache(e.to_string()))?;
        AcquireOutcome::Allowed {
            remaining: budget - count - 1,
        }
    } else {
        AcquireOutcome::Denied {
            retry_after_secs: (window_start + window_secs - now).max(0),
        }
    };

    tx.commit().map_err(|e| Error::cache(e.to_string()))?;
    Ok(outcome)
}

/// Current counter for `service`, if one has been recorded.
pub fn get(conn: &Connection, service: &str) -> Result<Option<RateWindowRow>> {
    read(conn, service)
}

/// Drop the counter for `service`, starting a fresh window on the next call.
pub fn reset(conn: &Connection, service: &str) -> Result<bool> {
    let affected = conn
        .execute(
            "DELETE FROM rate_windows WHERE service = ?1",
            params![service],
        )
        .map_err(|e| Error::cache(e.to_string()))?;
    Ok(affected > 0)
}

fn read(conn: &Connection, service: &str) -> Result<Option<RateWindowRow>> {
    conn.query_row(
        "SELECT window_start, count FROM rate_windows WHERE service = ?1",
        params![service],
        |row| {
            Ok(RateWindowRow {
                window_start: row.get(0)?,
                count: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(|e| Error::cache(e.to_string()))
}
