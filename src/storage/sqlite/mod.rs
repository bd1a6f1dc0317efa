//! `SQLite` grid backend.
//!
//! ## Module Structure
//!
//! - [`connection`]: `Mutex<Connection>` handling and pragma setup
//! - [`backend`]: [`SqliteGridBackend`], the [`GridBackend`](crate::storage::GridBackend)
//!   implementation and value conversion
//! - [`metrics`]: per-query metrics recording

mod backend;
mod connection;
mod metrics;

pub use backend::{SqliteGridBackend, value_to_json};
pub use connection::{acquire_lock, configure_connection};
pub use metrics::record_operation_metrics;
