//! Trusted grid registrations.
//!
//! The endpoint never uses a caller-supplied `table` parameter as SQL. It
//! only looks the identifier up here; the physical table, the projection
//! and the sort whitelist all come from server-side configuration.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::GridConfig;
use crate::query::sanitize_identifier;
use crate::{Error, Result};

/// Server-side description of one queryable grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSource {
    /// Identifier clients send as `table`.
    pub table_id: String,
    /// Physical table or view name.
    pub table_name: String,
    /// Projected columns, in order.
    pub columns: Vec<String>,
    /// Columns the search term is matched against.
    pub searchable: Vec<String>,
    /// Sort whitelist.
    pub sortable: Vec<String>,
    /// Page size used when a request carries none.
    pub default_per_page: i64,
}

impl TableSource {
    /// Creates a source whose every column is searchable and none sortable.
    #[must_use]
    pub fn new(
        table_id: impl Into<String>,
        table_name: impl Into<String>,
        columns: Vec<String>,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            table_name: table_name.into(),
            searchable: columns.clone(),
            columns,
            sortable: Vec::new(),
            default_per_page: crate::config::DEFAULT_PER_PAGE,
        }
    }

    /// Sets the searchable columns.
    #[must_use]
    pub fn with_searchable(mut self, columns: Vec<String>) -> Self {
        self.searchable = columns;
        self
    }

    /// Sets the sort whitelist.
    #[must_use]
    pub fn with_sortable(mut self, columns: Vec<String>) -> Self {
        self.sortable = columns;
        self
    }

    /// Sets the default page size.
    #[must_use]
    pub const fn with_default_per_page(mut self, per_page: i64) -> Self {
        self.default_per_page = per_page;
        self
    }

    /// Checks that every identifier survives sanitization and that the
    /// searchable and sortable sets are subsets of the projection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] listing every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.table_id.trim().is_empty() {
            errors.push("table id is required".to_string());
        }
        if sanitize_identifier(&self.table_name).is_empty() {
            errors.push(format!("table name '{}' is not a valid identifier", self.table_name));
        }
        if self.columns.is_empty() {
            errors.push("at least one column is required".to_string());
        }
        for column in &self.columns {
            if sanitize_identifier(column).is_empty() {
                errors.push(format!("column '{column}' is not a valid identifier"));
            }
        }
        for (kind, set) in [("searchable", &self.searchable), ("sortable", &self.sortable)] {
            for column in set {
                if !self.columns.contains(column) {
                    errors.push(format!("{kind} column '{column}' is not projected"));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "table '{}': {}",
                self.table_id,
                errors.join("; ")
            )))
        }
    }
}

/// A registered grid: its query source plus the client configuration served
/// at `{api_path}/config`.
#[derive(Debug, Clone)]
pub struct RegisteredTable {
    /// Query source.
    pub source: TableSource,
    /// Client configuration.
    pub grid: GridConfig,
}

/// Maps grid identifiers to trusted table registrations.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: HashMap<String, Arc<RegisteredTable>>,
}

impl TableRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the source or grid configuration is
    /// invalid, the two disagree on the identifier, or the identifier is
    /// already registered.
    pub fn register(&mut self, source: TableSource, grid: GridConfig) -> Result<()> {
        source.validate()?;
        grid.validate()?;
        if grid.table_id != source.table_id {
            return Err(Error::Validation(format!(
                "grid config '{}' does not match table '{}'",
                grid.table_id, source.table_id
            )));
        }
        if self.tables.contains_key(&source.table_id) {
            return Err(Error::Validation(format!(
                "table '{}' is registered twice",
                source.table_id
            )));
        }

        tracing::debug!(
            table_id = %source.table_id,
            table_name = %source.table_name,
            columns = source.columns.len(),
            "Registered grid table"
        );
        self.tables.insert(
            source.table_id.clone(),
            Arc::new(RegisteredTable { source, grid }),
        );
        Ok(())
    }

    /// Looks up a grid by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`] if nothing is registered under `table_id`.
    pub fn resolve(&self, table_id: &str) -> Result<Arc<RegisteredTable>> {
        self.tables
            .get(table_id)
            .cloned()
            .ok_or_else(|| Error::UnknownTable(table_id.to_string()))
    }

    /// Returns the registered identifiers, sorted.
    #[must_use]
    pub fn table_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of registered grids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if no grid is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
