//! Grid services.
//!
//! The registry decides which tables may be queried; the provider runs the
//! count and page queries for a registered table.

mod provider;
mod registry;

pub use provider::DataProvider;
pub use registry::{RegisteredTable, TableRegistry, TableSource};
