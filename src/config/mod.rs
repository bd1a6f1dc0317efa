//! Configuration management.
//!
//! [`ServiceConfig`] configures the server process and is read from TOML.
//! [`GridConfig`] configures one client grid and travels as JSON.

mod grid;

pub use grid::{
    CellFormat, DEFAULT_API_URL, DEFAULT_PER_PAGE, DEFAULT_PER_PAGE_OPTIONS, GridConfig,
    GridLabels,
};

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::observability::{LoggingConfig, MetricsConfig};
use crate::services::{TableRegistry, TableSource};
use crate::{Error, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TABLEGRID_CONFIG_PATH";

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Default database file.
pub const DEFAULT_DATABASE: &str = "tablegrid.sqlite";

/// Server configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceConfig {
    /// Listen address.
    pub bind: String,
    /// `SQLite` database file.
    pub database: PathBuf,
    /// Open the database with writes disabled.
    pub read_only: bool,
    /// Grid endpoint path; the config endpoint lives at `{api_path}/config`.
    pub api_path: String,
    /// Return raw query errors to callers instead of a generic message.
    pub expose_errors: bool,
    /// Logging setup.
    pub logging: LoggingConfig,
    /// Prometheus exporter setup.
    pub metrics: MetricsConfig,
    /// Registered grids.
    pub tables: Vec<TableConfig>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            database: PathBuf::from(DEFAULT_DATABASE),
            read_only: true,
            api_path: DEFAULT_API_URL.to_string(),
            expose_errors: false,
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
            tables: Vec::new(),
        }
    }
}

/// One `[[tables]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Identifier clients send as `table`.
    pub id: String,
    /// Physical table or view.
    pub table: String,
    /// Projected fields, in display order.
    pub fields: Vec<FieldConfig>,
    /// Sort whitelist.
    #[serde(default)]
    pub sortable: Vec<String>,
    /// Searched fields; every field when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable: Option<Vec<String>>,
    /// Page-size choices offered to clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page_options: Option<Vec<i64>>,
    /// Default page size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_per_page: Option<i64>,
}

/// One projected field of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Column name.
    pub name: String,
    /// Header label; the name when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Display format.
    #[serde(default)]
    pub format: CellFormat,
}

impl TableConfig {
    fn column_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    /// Builds the server-side query source.
    #[must_use]
    pub fn to_source(&self) -> TableSource {
        let columns = self.column_names();
        let searchable = self.searchable.clone().unwrap_or_else(|| columns.clone());
        TableSource::new(&self.id, &self.table, columns)
            .with_searchable(searchable)
            .with_sortable(self.sortable.clone())
            .with_default_per_page(self.default_per_page.unwrap_or(DEFAULT_PER_PAGE))
    }

    /// Builds the client configuration served for this table.
    #[must_use]
    pub fn to_grid_config(&self, api_url: &str) -> GridConfig {
        let mut grid = GridConfig::new(&self.id).with_api_url(api_url);
        for field in &self.fields {
            grid = grid.add_field(&field.name, field.label.as_deref().unwrap_or(&field.name));
            if field.format != CellFormat::Text {
                grid = grid.with_format(&field.name, field.format);
            }
        }
        for field in &self.sortable {
            grid = grid.add_sortable(field);
        }
        if let Some(options) = &self.per_page_options {
            grid.per_page_options.clone_from(options);
        }
        if let Some(per_page) = self.default_per_page {
            grid.default_per_page = per_page;
        }
        grid
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Listen address.
    pub bind: Option<String>,
    /// Database file.
    pub database: Option<String>,
    /// Read-only database access.
    pub read_only: Option<bool>,
    /// Grid endpoint path.
    pub api_path: Option<String>,
    /// Expose raw query errors.
    pub expose_errors: Option<bool>,
    /// Logging section.
    pub logging: Option<LoggingConfig>,
    /// Metrics section.
    pub metrics: Option<MetricsConfig>,
    /// Table registrations.
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

impl ServiceConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the platform config dir (`~/.config/tablegrid/config.toml` on
    /// Linux). Returns defaults if no file is found or it cannot be parsed.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                Self::default()
            },
        }
    }

    /// Loads configuration from `explicit`, else from the file named by
    /// `TABLEGRID_CONFIG_PATH`, else from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file cannot be loaded.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Self::load_from_file(Path::new(&path));
        }
        Ok(Self::load_default())
    }

    /// Returns the platform config file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tablegrid")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Converts a `ConfigFile` to `ServiceConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(bind) = file.bind {
            config.bind = bind;
        }
        if let Some(database) = file.database {
            config.database = PathBuf::from(database);
        }
        if let Some(read_only) = file.read_only {
            config.read_only = read_only;
        }
        if let Some(api_path) = file.api_path {
            config.api_path = api_path;
        }
        if let Some(expose_errors) = file.expose_errors {
            config.expose_errors = expose_errors;
        }
        if let Some(logging) = file.logging {
            config.logging = logging;
        }
        if let Some(metrics) = file.metrics {
            config.metrics = metrics;
        }
        config.tables = file.tables;

        config
    }

    /// Sets the listen address.
    #[must_use]
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    /// Parses the listen address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| Error::Validation(format!("bind address '{}': {e}", self.bind)))
    }

    /// Checks the endpoint settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unparseable bind address or an
    /// API path that is not an absolute path without a trailing slash.
    pub fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        if !self.api_path.starts_with('/') || self.api_path.len() < 2 || self.api_path.ends_with('/')
        {
            return Err(Error::Validation(format!(
                "api_path '{}' must start with '/' and not end with '/'",
                self.api_path
            )));
        }
        Ok(())
    }

    /// Finds a table entry by identifier.
    #[must_use]
    pub fn table(&self, id: &str) -> Option<&TableConfig> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Registers every configured table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for the first invalid table.
    pub fn build_registry(&self) -> Result<TableRegistry> {
        let mut registry = TableRegistry::new();
        for table in &self.tables {
            registry.register(table.to_source(), table.to_grid_config(&self.api_path))?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::LogFormat;

    const SAMPLE: &str = r#"
bind = "0.0.0.0:9000"
database = "data/grid.sqlite"
api_path = "/grid"
expose_errors = true

[logging]
format = "json"
filter = "debug"

[[tables]]
id = "users"
table = "app_users"
sortable = ["id", "name"]
searchable = ["name"]
per_page_options = [10, 25]
default_per_page = 25
fields = [
  { name = "id", label = "ID", format = "number" },
  { name = "name", label = "Name" },
  { name = "created_at", format = "date" },
]
"#;

    fn write_sample(dir: &Path) -> PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::new();
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.api_path, "/api/table");
        assert!(config.read_only);
        assert!(!config.expose_errors);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file_merges_onto_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::load_from_file(&write_sample(dir.path())).unwrap();

        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.database, PathBuf::from("data/grid.sqlite"));
        assert!(config.read_only);
        assert!(config.expose_errors);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.metrics.enabled);
        assert_eq!(config.tables.len(), 1);
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = ServiceConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(Error::OperationFailed { .. })));
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "bind = ").unwrap();
        assert!(ServiceConfig::load_from_file(&path).is_err());
    }

    #[test]
    fn test_table_to_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::load_from_file(&write_sample(dir.path())).unwrap();
        let source = config.table("users").unwrap().to_source();

        assert_eq!(source.table_name, "app_users");
        assert_eq!(source.columns, vec!["id", "name", "created_at"]);
        assert_eq!(source.searchable, vec!["name"]);
        assert_eq!(source.sortable, vec!["id", "name"]);
        assert_eq!(source.default_per_page, 25);
    }

    #[test]
    fn test_table_to_grid_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::load_from_file(&write_sample(dir.path())).unwrap();
        let grid = config.table("users").unwrap().to_grid_config(&config.api_path);

        assert_eq!(grid.table_id, "users");
        assert_eq!(grid.api_url, "/grid");
        assert_eq!(grid.label_for("created_at"), "created_at");
        assert_eq!(grid.format_for("id"), CellFormat::Number);
        assert_eq!(grid.format_for("name"), CellFormat::Text);
        assert_eq!(grid.per_page_options, vec![10, 25]);
        assert_eq!(grid.default_per_page, 25);
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_build_registry() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::load_from_file(&write_sample(dir.path())).unwrap();
        let registry = config.build_registry().unwrap();
        assert_eq!(registry.table_ids(), vec!["users"]);
    }

    #[test]
    fn test_build_registry_rejects_bad_table() {
        let mut config = ServiceConfig::new();
        config.tables.push(TableConfig {
            id: "t".to_string(),
            table: "t".to_string(),
            fields: vec![FieldConfig {
                name: "a".to_string(),
                label: None,
                format: CellFormat::Text,
            }],
            sortable: vec!["b".to_string()],
            searchable: None,
            per_page_options: None,
            default_per_page: None,
        });
        assert!(matches!(config.build_registry(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_validate_api_path_and_bind() {
        assert!(ServiceConfig::new().with_bind("nonsense").validate().is_err());

        let mut config = ServiceConfig::new();
        config.api_path = "api/table".to_string();
        assert!(config.validate().is_err());
        config.api_path = "/api/table/".to_string();
        assert!(config.validate().is_err());
        config.api_path = "/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::load_from_file(&write_sample(dir.path())).unwrap();
        let rendered = toml::to_string(&config).unwrap();

        let path = dir.path().join("rendered.toml");
        std::fs::write(&path, rendered).unwrap();
        let reloaded = ServiceConfig::load_from_file(&path).unwrap();
        assert_eq!(reloaded.tables, config.tables);
        assert_eq!(reloaded.bind, config.bind);
    }
}
