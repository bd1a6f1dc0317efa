//! Serve CLI command (grid endpoint).

use std::sync::Arc;

use crate::Result;
use crate::config::ServiceConfig;
use crate::http::{self, GridState};
use crate::observability::install_prometheus;
use crate::services::DataProvider;
use crate::storage::SqliteGridBackend;

/// Overrides applied on top of the loaded configuration.
#[derive(Debug, Default, Clone)]
pub struct ServeOptions {
    /// Listen address.
    pub bind: Option<String>,
    /// Database file.
    pub database: Option<std::path::PathBuf>,
}

/// Builds the grid router for `config`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the database cannot
/// be opened.
pub fn build_app(config: &ServiceConfig) -> Result<axum::Router> {
    config.validate()?;
    let registry = config.build_registry()?;
    if registry.is_empty() {
        tracing::warn!("No tables configured; every grid request will be rejected");
    }

    let backend = if config.read_only {
        SqliteGridBackend::open_read_only(&config.database)?
    } else {
        SqliteGridBackend::open(&config.database)?
    };
    tracing::info!(
        database = %config.database.display(),
        read_only = config.read_only,
        tables = ?registry.table_ids(),
        "Grid backend ready"
    );

    let provider = DataProvider::new(Arc::new(backend));
    let state = GridState::new(registry, provider, config.expose_errors);
    http::router(state, &config.api_path)
}

/// Runs the grid endpoint until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the app cannot be built or the listener fails.
pub async fn cmd_serve(config: ServiceConfig, options: ServeOptions) -> Result<()> {
    let mut config = config;
    if let Some(bind) = options.bind {
        config = config.with_bind(bind);
    }
    if let Some(database) = options.database {
        config.database = database;
    }

    let addr = config.bind_addr()?;
    let app = build_app(&config)?;

    let metrics = config.metrics.with_env_overrides();
    if install_prometheus(&metrics)? {
        tracing::info!(addr = %metrics.listen_addr(), "Prometheus exporter listening");
    }

    http::serve(addr, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CellFormat, FieldConfig, TableConfig};
    use tempfile::TempDir;

    fn config_with_db(dir: &TempDir) -> ServiceConfig {
        let database = dir.path().join("grid.sqlite");
        let backend = SqliteGridBackend::open(&database).unwrap();
        backend
            .execute_batch("CREATE TABLE users (id INTEGER, name TEXT);")
            .unwrap();

        let mut config = ServiceConfig::new();
        config.database = database;
        config.tables = vec![TableConfig {
            id: "users".to_string(),
            table: "users".to_string(),
            fields: vec![
                FieldConfig {
                    name: "id".to_string(),
                    label: None,
                    format: CellFormat::Number,
                },
                FieldConfig {
                    name: "name".to_string(),
                    label: Some("Name".to_string()),
                    format: CellFormat::Text,
                },
            ],
            sortable: vec!["name".to_string()],
            searchable: None,
            per_page_options: None,
            default_per_page: None,
        }];
        config
    }

    #[test]
    fn test_build_app_with_existing_database() {
        let dir = TempDir::new().unwrap();
        let config = config_with_db(&dir);
        assert!(build_app(&config).is_ok());
    }

    #[test]
    fn test_build_app_rejects_missing_read_only_database() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_db(&dir);
        config.database = dir.path().join("missing.sqlite");
        assert!(build_app(&config).is_err());
    }

    #[test]
    fn test_build_app_rejects_bad_api_path() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_db(&dir);
        config.api_path = "api/table/".to_string();
        assert!(build_app(&config).is_err());
    }
}
