//! Client side of the grid.
//!
//! ## Module Structure
//!
//! - [`session`]: pure interaction state and request generations
//! - [`controller`]: async [`GridController`] tying the session to a
//!   transport, a debounce timer and stored preferences
//! - [`view`]: render model and HTML output
//! - [`format`]: per-column value formatting
//! - [`preferences`]: durable page-size and column-visibility storage
//! - [`transport`]: the [`GridTransport`] seam and its HTTP implementation
//! - [`debounce`]: the search timer

pub mod controller;
pub mod debounce;
pub mod format;
pub mod preferences;
pub mod session;
pub mod transport;
pub mod view;

pub use controller::GridController;
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use format::format_value;
pub use preferences::{
    COLUMNS_KEY_PREFIX, FilePreferences, MemoryPreferences, PER_PAGE_KEY, PreferenceStore,
    columns_key,
};
pub use session::{FetchTicket, GridSession};
pub use transport::{GridTransport, HttpTransport};
pub use view::{Cell, GridBody, GridView, HeaderCell, PageButton, PageButtonKind, TableView};
