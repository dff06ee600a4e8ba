//! Result cache queries.
//!
//! Each `put` replaces the whole row for its key. Reads ignore rows whose
//! expiry has passed; `purge_expired` removes them.

use mediabot_common::{Error, Result};
use rusqlite::{params, Connection};

use crate::models::CacheRow;

/// Store `payload` under `key`, replacing any previous entry.
pub fn put(
    conn: &Connection,
    key: &str,
    payload: &str,
    stored_at: i64,
    expires_at: i64,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO result_cache (cache_key, payload, stored_at, expires_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![key, payload, stored_at, expires_at],
    )
    .map_err(|e| Error::cache(e.to_string()))?;

    Ok(())
}

/// Get the live entry for `key` as of `now`.
pub fn get(conn: &Connection, key: &str, now: i64) -> Result<Option<CacheRow>> {
    match conn.query_row(
        "SELECT cache_key, payload, stored_at, expires_at
         FROM result_cache WHERE cache_key = ?1 AND expires_at > ?2",
        params![key, now],
        |row| {
            Ok(CacheRow {
                cache_key: row.get(0)?,
                payload: row.get(1)?,
                stored_at: row.get(2)?,
                expires_at: row.get(3)?,
            })
        },
    ) {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::cache(e.to_string())),
    }
}

pub fn delete(conn: &Connection, key: &str) -> Result<bool> {
    let affected = conn
        .execute("DELETE FROM result_cache WHERE cache_key = ?1", params![key])
        .map_err(|e| Error::cache(e.to_string()))?;

    Ok(affected > 0)
}

/// Delete every entry expired as of `now`. Returns the number removed.
pub fn purge_expired(conn: &Connection, now: i64) -> Result<usize> {
    conn.execute(
        "DELETE FROM result_cache WHERE expires_at <= ?1",
        params![now],
    )
    .map_err(|e| Error::cache(e.to_string()))
}

/// Delete every entry. Returns the number removed.
pub fn clear(conn: &Connection) -> Result<usize> {
    conn.execute("DELETE FROM result_cache", [])
        .map_err(|e| Error::cache(e.to_string()))
}

/// Number of rows, live or expired.
pub fn count(conn: &Connection) -> Result<usize> {
    conn.query_row("SELECT COUNT(*) FROM result_cache", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as usize)
    .map_err(|e| Error::cache(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{init_memory_pool, PooledConnection};

    fn setup_test_db() -> PooledConnection {
        let pool = init_memory_pool().unwrap();
        pool.get().unwrap()
    }

    #[test]
    fn test_put_and_get() {
        let conn = setup_test_db();
        put(&conn, "tmdb:dune:en-US", r#"{"kind":"movie"}"#, 100, 200).unwrap();

        let row = get(&conn, "tmdb:dune:en-US", 150).unwrap().unwrap();
        assert_eq!(row.payload, r#"{"kind":"movie"}"#);
        assert_eq!(row.stored_at, 100);
        assert_eq!(row.expires_at, 200);
    }

    #[test]
    fn test_get_ignores_expired() {
        let conn = setup_test_db();
        put(&conn, "k", "{}", 100, 200).unwrap();

        assert!(get(&conn, "k", 199).unwrap().is_some());
        assert!(get(&conn, "k", 200).unwrap().is_none());
        assert!(get(&conn, "missing", 0).unwrap().is_none());
    }

    #[test]
    fn test_put_replaces() {
        let conn = setup_test_db();
        put(&conn, "k", "old", 0, 100).unwrap();
        put(&conn, "k", "new", 10, 500).unwrap();

        let row = get(&conn, "k", 50).unwrap().unwrap();
        assert_eq!(row.payload, "new");
        assert_eq!(count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_purge_expired() {
        let conn = setup_test_db();
        put(&conn, "a", "{}", 0, 100).unwrap();
        put(&conn, "b", "{}", 0, 300).unwrap();

        assert_eq!(purge_expired(&conn, 200).unwrap(), 1);
        assert_eq!(count(&conn).unwrap(), 1);
        assert!(get(&conn, "b", 200).unwrap().is_some());
    }

    #[test]
    fn test_delete_and_clear() {
        let conn = setup_test_db();
        put(&conn, "a", "{}", 0, 100).unwrap();
        put(&conn, "b", "{}", 0, 100).unwrap();

        assert!(delete(&conn, "a").unwrap());
        assert!(!delete(&conn, "a").unwrap());
        assert_eq!(clear(&conn).unwrap(), 1);
        assert_eq!(count(&conn).unwrap(), 0);
    }
}
