//! Per-grid client configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::models::{MAX_PER_PAGE, MIN_PER_PAGE};
use crate::{Error, Result};

/// Default endpoint path.
pub const DEFAULT_API_URL: &str = "/api/table";

/// Default page-size choices.
pub const DEFAULT_PER_PAGE_OPTIONS: [i64; 4] = [5, 10, 20, 50];

/// Default page size.
pub const DEFAULT_PER_PAGE: i64 = 10;

/// How a cell value is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    /// Plain text (default).
    #[default]
    Text,
    /// Integer with thousands separators.
    Number,
    /// Two decimals, thousands separators and a currency suffix.
    Currency,
    /// Yes/no label.
    Boolean,
    /// `YYYY-MM-DD`.
    Date,
    /// `YYYY-MM-DD HH:MM`.
    DateTime,
}

/// Localized strings used when rendering a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLabels {
    /// Shown instead of the table when a page has no rows.
    pub empty: String,
    /// Fallback for failures that carry no message.
    pub error: String,
    /// Shown while a fetch is in flight.
    pub loading: String,
    /// First-page button.
    pub first: String,
    /// Previous-page button.
    pub prev: String,
    /// Next-page button.
    pub next: String,
    /// Last-page button.
    pub last: String,
    /// Prefix of the `start–end / total` records line.
    pub records_prefix: String,
    /// Truthy boolean cells.
    pub yes: String,
    /// Falsy boolean cells.
    pub no: String,
    /// Appended to currency cells, separated by a space.
    pub currency_suffix: String,
}

impl Default for GridLabels {
    fn default() -> Self {
        Self {
            empty: "No records found".to_string(),
            error: "Error".to_string(),
            loading: "Loading...".to_string(),
            first: "First".to_string(),
            prev: "Prev".to_string(),
            next: "Next".to_string(),
            last: "Last".to_string(),
            records_prefix: "Showing".to_string(),
            yes: "Yes".to_string(),
            no: "No".to_string(),
            currency_suffix: "₾".to_string(),
        }
    }
}

/// Configuration of one grid instance.
///
/// Immutable once a controller is built from it. Missing fields take the
/// documented defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Grid identifier sent as the `table` parameter.
    pub table_id: String,
    /// Field names in display order.
    pub columns: Vec<String>,
    /// Display label per field; fields without one show their name.
    pub headers: HashMap<String, String>,
    /// Fields whose header can be clicked to sort.
    pub sortable: Vec<String>,
    /// Display format per field; unlisted fields are text.
    pub formats: HashMap<String, CellFormat>,
    /// Page-size choices.
    pub per_page_options: Vec<i64>,
    /// Page size before any stored preference applies.
    pub default_per_page: i64,
    /// Grid endpoint URL or path.
    pub api_url: String,
    /// Search box placeholder.
    pub search_placeholder: String,
    /// Column menu button text.
    pub columns_button_text: String,
    /// Whether search edits trigger fetches.
    pub search_enabled: bool,
    /// Whether the pagination control is rendered.
    pub pagination_enabled: bool,
    /// Localized strings.
    pub labels: GridLabels,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            table_id: String::new(),
            columns: Vec::new(),
            headers: HashMap::new(),
            sortable: Vec::new(),
            formats: HashMap::new(),
            per_page_options: DEFAULT_PER_PAGE_OPTIONS.to_vec(),
            default_per_page: DEFAULT_PER_PAGE,
            api_url: DEFAULT_API_URL.to_string(),
            search_placeholder: "Search".to_string(),
            columns_button_text: "Columns ▾".to_string(),
            search_enabled: true,
            pagination_enabled: true,
            labels: GridLabels::default(),
        }
    }
}

impl GridConfig {
    /// Creates a configuration with defaults for the given grid.
    #[must_use]
    pub fn new(table_id: impl Into<String>) -> Self {
        Self {
            table_id: table_id.into(),
            ..Self::default()
        }
    }

    /// Adds a field, or relabels it if present.
    #[must_use]
    pub fn add_field(mut self, name: impl Into<String>, label: impl Into<String>) -> Self {
        let name = name.into();
        if !self.columns.contains(&name) {
            self.columns.push(name.clone());
        }
        self.headers.insert(name, label.into());
        self
    }

    /// Removes a field together with its label, format and sortability.
    #[must_use]
    pub fn remove_field(mut self, name: &str) -> Self {
        self.columns.retain(|c| c != name);
        self.headers.remove(name);
        self.formats.remove(name);
        self.sortable.retain(|c| c != name);
        self
    }

    /// Marks a field sortable; adding it twice has no effect.
    #[must_use]
    pub fn add_sortable(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.sortable.contains(&name) {
            self.sortable.push(name);
        }
        self
    }

    /// Removes a field from the sortable set.
    #[must_use]
    pub fn remove_sortable(mut self, name: &str) -> Self {
        self.sortable.retain(|c| c != name);
        self
    }

    /// Sets a field's display format.
    #[must_use]
    pub fn with_format(mut self, name: impl Into<String>, format: CellFormat) -> Self {
        self.formats.insert(name.into(), format);
        self
    }

    /// Sets the endpoint URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Enables or disables search.
    #[must_use]
    pub const fn with_search_enabled(mut self, enabled: bool) -> Self {
        self.search_enabled = enabled;
        self
    }

    /// Enables or disables the pagination control.
    #[must_use]
    pub const fn with_pagination_enabled(mut self, enabled: bool) -> Self {
        self.pagination_enabled = enabled;
        self
    }

    /// Sets the page-size choices and default.
    #[must_use]
    pub fn with_per_page(mut self, options: Vec<i64>, default_per_page: i64) -> Self {
        self.per_page_options = options;
        self.default_per_page = default_per_page;
        self
    }

    /// Returns the display label for a field.
    #[must_use]
    pub fn label_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.headers.get(field).map_or(field, String::as_str)
    }

    /// Returns the display format for a field.
    #[must_use]
    pub fn format_for(&self, field: &str) -> CellFormat {
        self.formats.get(field).copied().unwrap_or_default()
    }

    /// Returns whether `field` may be sorted on.
    #[must_use]
    pub fn is_sortable(&self, field: &str) -> bool {
        self.sortable.iter().any(|f| f == field)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] listing every problem found.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.table_id.trim().is_empty() {
            errors.push("table id is required".to_string());
        }
        if self.columns.is_empty() {
            errors.push("at least one field is required".to_string());
        }
        for field in &self.sortable {
            if !self.columns.contains(field) {
                errors.push(format!("sortable field '{field}' is not a column"));
            }
        }
        for field in self.headers.keys().chain(self.formats.keys()) {
            if !self.columns.contains(field) {
                errors.push(format!("field '{field}' is configured but not a column"));
            }
        }
        if self.per_page_options.is_empty() {
            errors.push("at least one per-page option is required".to_string());
        }
        if let Some(bad) = self
            .per_page_options
            .iter()
            .find(|n| !(MIN_PER_PAGE..=MAX_PER_PAGE).contains(*n))
        {
            errors.push(format!(
                "per-page option {bad} is outside {MIN_PER_PAGE}..={MAX_PER_PAGE}"
            ));
        }
        if !(MIN_PER_PAGE..=MAX_PER_PAGE).contains(&self.default_per_page) {
            errors.push(format!(
                "default per-page {} is outside {MIN_PER_PAGE}..={MAX_PER_PAGE}",
                self.default_per_page
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors.join("; ")))
        }
    }

    /// Writes the configuration as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] if serialization or the write fails.
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::OperationFailed {
            operation: "serialize_grid_config".to_string(),
            cause: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| Error::OperationFailed {
            operation: "write_grid_config".to_string(),
            cause: format!("{}: {e}", path.display()),
        })
    }

    /// Reads and validates a configuration written by [`Self::export_json`].
    ///
    /// Returns `Ok(None)` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OperationFailed`] for unreadable or malformed files
    /// and [`Error::Validation`] for invalid contents.
    pub fn import_json(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_grid_config".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_grid_config".to_string(),
            cause: e.to_string(),
        })?;
        config.validate()?;
        Ok(Some(config))
    }
}
