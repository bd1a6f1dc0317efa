//! Connection handling for the `SQLite` grid backend.

use crate::{Error, Result};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

/// Acquires a mutex, recovering from poisoning.
///
/// A panic while a query held the lock leaves the connection itself usable,
/// so the guard is recovered and a warning is logged instead of failing
/// every later request.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            metrics::counter!("sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Applies read-oriented pragmas to a grid connection.
///
/// - **WAL mode** so grid reads do not block the application writing rows
/// - **NORMAL synchronous**
/// - **`busy_timeout` 5000 ms** so a concurrent writer delays rather than
///   fails a page load
/// - **`query_only`** when `read_only` is set, since grids never write
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if `query_only` cannot be enabled.
pub fn configure_connection(conn: &Connection, read_only: bool) -> Result<()> {
    // journal_mode returns a row, so pragma_update's result is ignored
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    let _ = conn.pragma_update(None, "busy_timeout", "5000");

    if read_only {
        conn.pragma_update(None, "query_only", "ON")
            .map_err(|e| Error::OperationFailed {
                operation: "configure_connection".to_string(),
                cause: e.to_string(),
            })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_acquire_lock_recovers_from_poison() {
        let mutex = Arc::new(Mutex::new(7));
        let poisoner = Arc::clone(&mutex);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(mutex.is_poisoned());
        assert_eq!(*acquire_lock(&mutex), 7);
    }

    #[test]
    fn test_configure_connection() {
        let conn = Connection::open_in_memory().unwrap();
        configure_connection(&conn, false).unwrap();

        let busy_timeout: i32 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .unwrap();
        assert_eq!(busy_timeout, 5000);

        let synchronous: i32 = conn
            .pragma_query_value(None, "synchronous", |row| row.get(0))
            .unwrap();
        assert_eq!(synchronous, 1, "Expected NORMAL synchronous mode (1)");
    }

    #[test]
    fn test_configure_connection_read_only_rejects_writes() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();
        configure_connection(&conn, true).unwrap();

        assert!(conn.execute("INSERT INTO t (id) VALUES (1)", []).is_err());
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
