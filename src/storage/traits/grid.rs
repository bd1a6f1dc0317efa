//! Grid backend trait.
//!
//! # Error Modes
//!
//! Every failure to execute a query (connection loss, unknown column from
//! a misconfigured projection, locked database) is reported as
//! [`Error::QueryExecution`](crate::Error::QueryExecution) carrying the raw
//! driver text. Callers decide how much of that text leaves the process.

use crate::Result;
use crate::models::Row;
use crate::query::BoundQuery;

/// Executes grid queries against one backing store.
///
/// # Implementor Notes
///
/// - Methods use `&self` to enable sharing via `Arc<dyn GridBackend>`
/// - Use interior mutability (e.g., `Mutex<Connection>`) for mutable state
/// - Bind `query.params` positionally, in order
/// - Never alter the SQL text
pub trait GridBackend: Send + Sync {
    /// Short backend name for logs and metrics.
    fn backend_name(&self) -> &'static str;

    /// Runs a `COUNT(*)` query and returns its single value.
    fn count(&self, query: &BoundQuery) -> Result<u64>;

    /// Runs a bounded select and returns one [`Row`] per result row.
    ///
    /// `columns` names the projected columns in select order; row keys use
    /// these names.
    fn fetch_rows(&self, query: &BoundQuery, columns: &[String]) -> Result<Vec<Row>>;
}
