//! [`GridBackend`] over a single `SQLite` database.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, OpenFlags, ToSql, params_from_iter};
use serde_json::Value;

use super::{acquire_lock, configure_connection, record_operation_metrics};
use crate::models::Row;
use crate::query::{BoundQuery, SqlParam};
use crate::storage::GridBackend;
use crate::{Error, Result};

/// `SQLite`-backed grid data source.
///
/// Holds one connection behind a mutex; the endpoint calls it from
/// blocking tasks, so a page load never stalls the async runtime.
pub struct SqliteGridBackend {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteGridBackend {
    /// Opens (or creates) a database file for reading and writing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| open_error(path, &e))?;
        configure_connection(&conn, false)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Opens an existing database file with writes disabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if the file does not exist or
    /// cannot be opened.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| open_error(path, &e))?;
        configure_connection(&conn, true)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Creates a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if `SQLite` cannot allocate it.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::OperationFailed {
            operation: "open_in_memory".to_string(),
            cause: e.to_string(),
        })?;
        configure_connection(&conn, false)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    /// Runs a batch of statements, e.g. schema and seed data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueryExecution`] if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = acquire_lock(&self.conn);
        conn.execute_batch(sql)
            .map_err(|e| query_error("execute_batch", &e))
    }

    /// Returns the database path, or `None` for in-memory databases.
    #[must_use]
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }
}

impl std::fmt::Debug for SqliteGridBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteGridBackend")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl GridBackend for SqliteGridBackend {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    fn count(&self, query: &BoundQuery) -> Result<u64> {
        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            conn.query_row(&query.sql, params_from_iter(query.params.iter()), |row| {
                row.get::<_, i64>(0)
            })
        };
        record_operation_metrics(self.backend_name(), "count", start, status_of(&result));

        let count = result.map_err(|e| query_error("count", &e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn fetch_rows(&self, query: &BoundQuery, columns: &[String]) -> Result<Vec<Row>> {
        let start = Instant::now();
        let result = {
            let conn = acquire_lock(&self.conn);
            select_rows(&conn, query, columns)
        };
        record_operation_metrics(self.backend_name(), "select", start, status_of(&result));

        result.map_err(|e| query_error("select", &e))
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Text(s) => s.to_sql(),
            Self::Integer(i) => i.to_sql(),
        }
    }
}

fn select_rows(
    conn: &Connection,
    query: &BoundQuery,
    columns: &[String],
) -> rusqlite::Result<Vec<Row>> {
    let mut stmt = conn.prepare(&query.sql)?;
    let rows = stmt.query_map(params_from_iter(query.params.iter()), |row| {
        let mut map = Row::new();
        for (idx, column) in columns.iter().enumerate() {
            map.insert(column.clone(), value_to_json(row.get_ref(idx)?));
        }
        Ok(map)
    })?;
    rows.collect()
}

/// Converts a `SQLite` cell into JSON.
///
/// Non-finite reals become `null`; BLOBs are hex-encoded; invalid UTF-8
/// text is replaced lossily.
#[must_use]
pub fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(hex::encode(bytes)),
    }
}

const fn status_of<T, E>(result: &std::result::Result<T, E>) -> &'static str {
    if result.is_ok() { "success" } else { "error" }
}

fn query_error(operation: &str, e: &rusqlite::Error) -> Error {
    Error::QueryExecution {
        operation: operation.to_string(),
        cause: e.to_string(),
    }
}

fn open_error(path: &Path, e: &rusqlite::Error) -> Error {
    Error::OperationFailed {
        operation: "open_database".to_string(),
        cause: format!("{}: {e}", path.display()),
    }
}
