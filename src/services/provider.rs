//! Page loading.

use std::sync::Arc;
use std::time::Instant;

use tracing::instrument;

use super::TableSource;
use crate::Result;
use crate::models::{GridRequest, GridResponse, PaginationInfo};
use crate::query::{build_count_query, build_order_clause, build_search_clause, build_select_query};
use crate::storage::GridBackend;

/// Runs grid queries against a backend.
///
/// Stateless apart from the shared backend handle; one provider serves
/// every registered table.
#[derive(Clone)]
pub struct DataProvider {
    backend: Arc<dyn GridBackend>,
}

impl DataProvider {
    /// Creates a provider over `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn GridBackend>) -> Self {
        Self { backend }
    }

    /// Returns the backend name, for logging.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// Loads one page of `source` for `request`.
    ///
    /// Counts the filtered rows first, derives pagination from the count,
    /// then selects the bounded page. The table, projection and whitelists
    /// come from `source`; from `request` only the page, page size, search
    /// term and sort field/direction are used.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::QueryExecution`] if either query fails.
    #[instrument(
        skip(self, source, request),
        fields(table_id = %source.table_id, page = request.page, per_page = request.per_page)
    )]
    pub fn fetch_page(&self, source: &TableSource, request: &GridRequest) -> Result<GridResponse> {
        let start = Instant::now();

        let search = build_search_clause(&source.searchable, &request.search);
        let order = build_order_clause(
            &request.sort_field,
            request.sort_dir.as_str(),
            &source.sortable,
        );

        let total_records = self
            .backend
            .count(&build_count_query(&source.table_name, &search))?;
        let pagination = PaginationInfo::calculate(total_records, request.page, request.per_page);

        let select = build_select_query(
            &source.table_name,
            &source.columns,
            &search,
            &order,
            &pagination,
        );
        let rows = self.backend.fetch_rows(&select, &source.columns)?;

        tracing::debug!(
            total_records,
            total_pages = pagination.total_pages,
            rows = rows.len(),
            filtered = !search.is_empty(),
            sorted = !order.is_empty(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Fetched grid page"
        );

        Ok(GridResponse::success(rows, &pagination))
    }
}

impl std::fmt::Debug for DataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProvider")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}
