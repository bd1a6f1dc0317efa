//! Storage layer abstraction.
//!
//! The grid endpoint reads from exactly one backing table or view per grid.
//! Backends receive fully built [`BoundQuery`](crate::query::BoundQuery)
//! values and only execute them; all SQL construction happens in
//! [`crate::query`].

// Connection guards are held for the whole query.
#![allow(clippy::significant_drop_tightening)]

pub mod sqlite;
pub mod traits;

pub use sqlite::SqliteGridBackend;
pub use traits::GridBackend;
