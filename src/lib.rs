//! # Tablegrid
//!
//! Paginated, sortable, searchable data grids whose rows are served by an
//! injection-safe SQL endpoint.
//!
//! The crate has two halves that share one wire contract:
//!
//! - **Server**: [`query`] turns untrusted grid parameters into bounded SQL,
//!   [`services::DataProvider`] runs it against a [`storage::GridBackend`],
//!   and [`http`] exposes the result as a JSON envelope.
//! - **Client**: [`client::GridController`] owns the per-grid interaction
//!   state (page, sort, search, page size, column visibility), talks to the
//!   endpoint through a [`client::GridTransport`], and re-renders a
//!   [`client::GridView`] after every response.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tablegrid::query::{build_order_clause, build_search_clause};
//!
//! let search = build_search_clause(&["name", "email"], "ann");
//! assert_eq!(
//!     search.sql,
//!     "WHERE name LIKE ? ESCAPE '\\' OR email LIKE ? ESCAPE '\\'"
//! );
//! let order = build_order_clause("name", "desc", &["name"]);
//! assert_eq!(order, "ORDER BY name DESC");
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod cli;
pub mod client;
pub mod config;
pub mod http;
pub mod models;
pub mod observability;
pub mod query;
pub mod services;
pub mod storage;

pub use client::{GridController, GridTransport, GridView, PreferenceStore};
pub use config::{GridConfig, ServiceConfig};
pub use models::{GridRequest, GridResponse, PaginationInfo, Row, SortDirection};
pub use services::{DataProvider, TableRegistry, TableSource};
pub use storage::{GridBackend, SqliteGridBackend};

/// Generic message returned to callers when a query fails and error
/// details are not exposed.
pub const GENERIC_QUERY_ERROR: &str = "Failed to load table data";

/// Error type for tablegrid operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Validation` | Grid or table configuration is incomplete or inconsistent |
/// | `InvalidInput` | A request is missing a field that cannot be defaulted |
/// | `UnknownTable` | A `table` parameter names no registered grid |
/// | `QueryExecution` | The backing store rejects or fails a query |
/// | `OperationFailed` | I/O, runtime, socket or file errors |
/// | `Transport` | The client cannot reach the endpoint or decode its reply |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Configuration failed validation.
    ///
    /// Raised at setup time (config loading, table registration, grid
    /// controller construction), never while serving a request.
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// Invalid request input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested grid is not registered.
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// A backing-store query failed.
    ///
    /// The cause carries raw driver text and is only ever logged, unless
    /// the deployment opts into exposing it.
    #[error("query '{operation}' failed: {cause}")]
    QueryExecution {
        /// The query stage that failed (`count`, `select`, ...).
        operation: String,
        /// The underlying driver error.
        cause: String,
    },

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The grid endpoint could not be reached or answered with something
    /// other than a grid envelope.
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Returns the message that may be shown to an untrusted caller.
    ///
    /// Query and internal failures collapse to [`GENERIC_QUERY_ERROR`]
    /// unless `expose_details` is set. Caller mistakes (unknown table,
    /// bad input) are always reported as-is since they carry no server
    /// internals.
    #[must_use]
    pub fn public_message(&self, expose_details: bool) -> String {
        match self {
            Self::UnknownTable(_) | Self::InvalidInput(_) => self.to_string(),
            _ if expose_details => self.to_string(),
            _ => GENERIC_QUERY_ERROR.to_string(),
        }
    }

    /// Returns true for errors caused by the caller rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::UnknownTable(_) | Self::InvalidInput(_))
    }
}

/// Result type alias for tablegrid operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Validation("table name is required".to_string());
        assert_eq!(
            err.to_string(),
            "invalid configuration: table name is required"
        );

        let err = Error::QueryExecution {
            operation: "count".to_string(),
            cause: "no such table: users".to_string(),
        };
        assert_eq!(err.to_string(), "query 'count' failed: no such table: users");
    }

    #[test]
    fn test_public_message_hides_driver_text() {
        let err = Error::QueryExecution {
            operation: "select".to_string(),
            cause: "no such column: secret_col".to_string(),
        };
        assert_eq!(err.public_message(false), GENERIC_QUERY_ERROR);
        assert!(err.public_message(true).contains("secret_col"));
    }

    #[test]
    fn test_public_message_keeps_client_errors() {
        let err = Error::UnknownTable("ghosts".to_string());
        assert_eq!(err.public_message(false), "unknown table: ghosts");
        assert!(err.is_client_error());
    }
}
