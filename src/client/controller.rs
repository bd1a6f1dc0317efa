//! Async driver of one grid instance.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

use super::debounce::{Debouncer, SEARCH_DEBOUNCE};
use super::preferences::{
    PreferenceStore, load_per_page, load_visible_columns, save_per_page, save_visible_columns,
};
use super::session::{FetchTicket, GridSession};
use super::transport::GridTransport;
use super::view::GridView;
use crate::Result;
use crate::config::GridConfig;

/// Drives a [`GridSession`] against a transport and a preference store.
///
/// Interactions mirror what a user can do with a rendered grid. Each one
/// that needs data sends a request and returns whether its response was
/// committed to the view; a response overtaken by a newer request is
/// dropped. Failures never surface as errors here: they end up in the view.
///
/// # Example
///
/// ```rust,ignore
/// use tablegrid::client::{GridController, HttpTransport, MemoryPreferences};
///
/// let transport = HttpTransport::new("http://127.0.0.1:8080/api/table")?;
/// let config = transport.fetch_config("users").await?;
/// let grid = GridController::new(config, transport, MemoryPreferences::new())?;
/// grid.load().await;
/// grid.click_header("name").await;
/// println!("{}", grid.view().to_html());
/// ```
pub struct GridController<T, P> {
    config: Arc<GridConfig>,
    session: Mutex<GridSession>,
    transport: T,
    preferences: P,
    debouncer: Debouncer,
}

impl<T, P> GridController<T, P>
where
    T: GridTransport + 'static,
    P: PreferenceStore + 'static,
{
    /// Validates `config`, restores stored preferences and builds the
    /// controller. Nothing is fetched until [`Self::load`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] if the configuration is invalid.
    pub fn new(config: GridConfig, transport: T, preferences: P) -> Result<Arc<Self>> {
        config.validate()?;
        let config = Arc::new(config);
        let per_page = load_per_page(&preferences, &config);
        let visible = load_visible_columns(&preferences, &config);
        let session = GridSession::new(Arc::clone(&config), per_page, visible);

        tracing::debug!(table_id = %config.table_id, per_page, "Grid controller created");

        Ok(Arc::new(Self {
            config,
            session: Mutex::new(session),
            transport,
            preferences,
            debouncer: Debouncer::new(SEARCH_DEBOUNCE),
        }))
    }

    /// Grid configuration.
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Snapshot of the current view.
    #[must_use]
    pub fn view(&self) -> GridView {
        self.lock().view().clone()
    }

    /// Runs `f` with the session locked.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut GridSession) -> R) -> R {
        f(&mut self.lock())
    }

    /// Fetches the current state.
    pub async fn load(&self) -> bool {
        let ticket = self.with_session(GridSession::begin_fetch);
        self.run(ticket).await
    }

    /// Records a search edit and (re)starts the debounce timer.
    ///
    /// When the timer fires the grid returns to page 1 and fetches. Edits
    /// are ignored when search is disabled.
    pub fn search_input(self: &Arc<Self>, text: impl Into<String>) {
        if !self.with_session(|s| s.set_search_text(text)) {
            return;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        self.debouncer.schedule(async move {
            if let Some(controller) = weak.upgrade() {
                let ticket = controller.with_session(GridSession::search_settled);
                controller.run(ticket).await;
            }
        });
    }

    /// Returns true while a search edit waits for its quiet period.
    #[must_use]
    pub fn search_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Changes the page size, stores it, returns to page 1 and fetches.
    pub async fn change_per_page(&self, per_page: i64) -> bool {
        if let Err(e) = save_per_page(&self.preferences, per_page) {
            tracing::warn!(table_id = %self.config.table_id, error = %e, "Failed to store page size");
        }
        let ticket = self.with_session(|s| s.change_per_page(per_page));
        self.run(ticket).await
    }

    /// Sorts by `field`, flipping the direction if it is already the sort
    /// field. Non-sortable fields do nothing and return false.
    pub async fn click_header(&self, field: &str) -> bool {
        let Some(ticket) = self.with_session(|s| s.click_header(field)) else {
            return false;
        };
        self.run(ticket).await
    }

    /// Goes to `page`. The current page and pages out of range do nothing
    /// and return false.
    pub async fn click_page(&self, page: i64) -> bool {
        let Some(ticket) = self.with_session(|s| s.click_page(page)) else {
            return false;
        };
        self.run(ticket).await
    }

    /// Shows or hides a column and stores the visible set. No fetch.
    ///
    /// Returns true if the visible set changed.
    pub fn toggle_column(&self, field: &str, visible: bool) -> bool {
        let changed = self.with_session(|s| {
            s.toggle_column(field, visible)
                .then(|| s.visible_columns().to_vec())
        });
        let Some(visible_columns) = changed else {
            return false;
        };

        if let Err(e) = save_visible_columns(&self.preferences, &self.config.table_id, &visible_columns)
        {
            tracing::warn!(table_id = %self.config.table_id, error = %e, "Failed to store visible columns");
        }
        true
    }

    async fn run(&self, ticket: FetchTicket) -> bool {
        let FetchTicket {
            generation,
            request,
        } = ticket;

        let outcome = self.transport.fetch(&request).await;
        if let Err(e) = &outcome {
            tracing::warn!(
                table_id = %self.config.table_id,
                page = request.page,
                error = %e,
                "Grid fetch failed"
            );
        }

        let committed = self.with_session(|s| s.complete_fetch(generation, outcome));
        metrics::counter!(
            "grid_client_responses_total",
            "outcome" => if committed { "committed" } else { "stale" }
        )
        .increment(1);
        committed
    }

    fn lock(&self) -> MutexGuard<'_, GridSession> {
        self.session
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<T, P> std::fmt::Debug for GridController<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridController")
            .field("table_id", &self.config.table_id)
            .finish_non_exhaustive()
    }
}
