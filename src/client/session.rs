//! Per-grid interaction state.
//!
//! [`GridSession`] holds no I/O: every transition either changes state
//! only, or returns a [`FetchTicket`] describing the request to send. The
//! caller sends it and hands the outcome back to
//! [`GridSession::complete_fetch`], which commits it only if no newer fetch
//! has been issued since.

use std::sync::Arc;

use super::view::GridView;
use crate::config::GridConfig;
use crate::models::{GridRequest, GridResponse, PaginationInfo, SortDirection};
use crate::Result;

/// A fetch to perform, tagged with the generation that must still be
/// current when its response arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Issue order of the fetch.
    pub generation: u64,
    /// Request to send.
    pub request: GridRequest,
}

/// State of one grid instance.
#[derive(Debug, Clone)]
pub struct GridSession {
    config: Arc<GridConfig>,
    current_page: i64,
    sort_field: String,
    sort_order: SortDirection,
    search_text: String,
    per_page: i64,
    visible_columns: Vec<String>,
    generation: u64,
    total_pages: Option<u64>,
    view: GridView,
}

impl GridSession {
    /// Creates the initial state: page 1, unsorted, no search.
    #[must_use]
    pub fn new(config: Arc<GridConfig>, per_page: i64, visible_columns: Vec<String>) -> Self {
        let view = GridView::loading(&config);
        Self {
            config,
            current_page: 1,
            sort_field: String::new(),
            sort_order: SortDirection::Asc,
            search_text: String::new(),
            per_page,
            visible_columns,
            generation: 0,
            total_pages: None,
            view,
        }
    }

    /// Grid configuration.
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Current page, 1-based.
    #[must_use]
    pub const fn current_page(&self) -> i64 {
        self.current_page
    }

    /// Current sort field, empty when unsorted.
    #[must_use]
    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    /// Current sort direction.
    #[must_use]
    pub const fn sort_order(&self) -> SortDirection {
        self.sort_order
    }

    /// Current search box text.
    #[must_use]
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Current page size.
    #[must_use]
    pub const fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Visible columns, in configuration order.
    #[must_use]
    pub fn visible_columns(&self) -> &[String] {
        &self.visible_columns
    }

    /// Generation of the most recently issued fetch.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Page count of the last committed page, if any.
    #[must_use]
    pub const fn total_pages(&self) -> Option<u64> {
        self.total_pages
    }

    /// What the grid currently shows.
    #[must_use]
    pub const fn view(&self) -> &GridView {
        &self.view
    }

    /// The request matching the current state.
    #[must_use]
    pub fn request(&self) -> GridRequest {
        GridRequest {
            table_id: self.config.table_id.clone(),
            page: self.current_page,
            search: self.search_text.clone(),
            sort_field: self.sort_field.clone(),
            sort_dir: self.sort_order,
            per_page: self.per_page,
        }
    }

    /// Issues a fetch for the current state and shows the loading state.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.view.body = GridView::loading(&self.config).body;
        FetchTicket {
            generation: self.generation,
            request: self.request(),
        }
    }

    /// Commits the outcome of fetch `generation`.
    ///
    /// Returns false and changes nothing if a newer fetch has been issued.
    /// Otherwise the view is rebuilt: rows, the empty state, or an error in
    /// place of the body.
    pub fn complete_fetch(&mut self, generation: u64, outcome: Result<GridResponse>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                table_id = %self.config.table_id,
                generation,
                latest = self.generation,
                "Discarding stale grid response"
            );
            return false;
        }

        self.view = match outcome {
            Ok(response) if response.success => {
                let pagination = PaginationInfo::calculate(
                    response.total_records,
                    self.current_page,
                    self.per_page,
                );
                self.total_pages = Some(pagination.total_pages);
                GridView::page(
                    &self.config,
                    response.rows(),
                    &pagination,
                    (self.sort_field.as_str(), self.sort_order),
                    &self.visible_columns,
                )
            },
            Ok(response) => GridView::error(&self.config, response.message.as_deref()),
            Err(e) => {
                let message = e.to_string();
                GridView::error(&self.config, Some(message.as_str()))
            },
        };
        true
    }

    /// Updates the search box text. Returns false, ignoring the edit, when
    /// search is disabled.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> bool {
        if !self.config.search_enabled {
            return false;
        }
        self.search_text = text.into();
        true
    }

    /// The search debounce fired: back to page 1 and fetch.
    pub fn search_settled(&mut self) -> FetchTicket {
        self.current_page = 1;
        self.begin_fetch()
    }

    /// Page size changed: back to page 1 and fetch.
    pub fn change_per_page(&mut self, per_page: i64) -> FetchTicket {
        self.per_page = per_page;
        self.current_page = 1;
        self.begin_fetch()
    }

    /// A header was clicked.
    ///
    /// Clicking the current sort field flips the direction; clicking another
    /// sortable field sorts by it ascending. Non-sortable fields do nothing.
    pub fn click_header(&mut self, field: &str) -> Option<FetchTicket> {
        if !self.config.is_sortable(field) {
            return None;
        }
        if self.sort_field == field {
            self.sort_order = self.sort_order.flipped();
        } else {
            self.sort_field = field.to_string();
            self.sort_order = SortDirection::Asc;
        }
        Some(self.begin_fetch())
    }

    /// A pagination button was clicked.
    ///
    /// Does nothing for the current page, pages below 1, or pages past the
    /// last known page.
    pub fn click_page(&mut self, page: i64) -> Option<FetchTicket> {
        let past_end = self
            .total_pages
            .is_some_and(|total| u64::try_from(page).is_ok_and(|p| p > total.max(1)));
        if page < 1 || page == self.current_page || past_end {
            return None;
        }
        self.current_page = page;
        Some(self.begin_fetch())
    }

    /// Shows or hides a column without fetching.
    ///
    /// Returns true if the visible set changed.
    pub fn toggle_column(&mut self, field: &str, visible: bool) -> bool {
        if !self.config.columns.iter().any(|c| c == field) {
            return false;
        }
        let is_visible = self.visible_columns.iter().any(|c| c == field);
        if is_visible == visible {
            return false;
        }

        self.visible_columns = self
            .config
            .columns
            .iter()
            .filter(|c| {
                if c.as_str() == field {
                    visible
                } else {
                    self.visible_columns.contains(*c)
                }
            })
            .cloned()
            .collect();
        self.view.apply_visibility(&self.config, &self.visible_columns);
        true
    }

    /// Sets the sort state without fetching.
    pub fn set_sort(&mut self, field: impl Into<String>, order: SortDirection) {
        self.sort_field = field.into();
        self.sort_order = order;
    }

    /// Sets the page without fetching; values below 1 become 1.
    pub fn set_page(&mut self, page: i64) {
        self.current_page = page.max(1);
    }

    /// Sets the page size without fetching.
    pub fn set_per_page(&mut self, per_page: i64) {
        self.per_page = per_page;
    }
}
