//! Config CLI command.

// CLI commands are allowed to use println! for output
#![allow(clippy::print_stdout)]

use std::path::Path;

use crate::config::{GridConfig, ServiceConfig};
use crate::{Error, Result};

/// Prints the effective server configuration as TOML.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the configuration cannot be
/// serialized.
pub fn cmd_config_show(config: &ServiceConfig) -> Result<()> {
    let toml = toml::to_string_pretty(config).map_err(|e| Error::OperationFailed {
        operation: "serialize_config".to_string(),
        cause: e.to_string(),
    })?;
    println!("{toml}");
    Ok(())
}

/// Writes the grid configuration of table `table_id` as JSON to `output`.
///
/// # Errors
///
/// Returns [`Error::UnknownTable`] if no such table is configured, or an
/// error if the file cannot be written.
pub fn cmd_config_export(config: &ServiceConfig, table_id: &str, output: &Path) -> Result<()> {
    let grid = export_grid_config(config, table_id)?;
    grid.export_json(output)?;
    println!("Exported grid '{table_id}' to {}", output.display());
    Ok(())
}

/// Builds and validates the grid configuration for `table_id`.
///
/// # Errors
///
/// Returns [`Error::UnknownTable`] if no such table is configured and
/// [`Error::Validation`] if the result is invalid.
pub fn export_grid_config(config: &ServiceConfig, table_id: &str) -> Result<GridConfig> {
    let table = config
        .table(table_id)
        .ok_or_else(|| Error::UnknownTable(table_id.to_string()))?;
    let grid = table.to_grid_config(&config.api_path);
    grid.validate()?;
    Ok(grid)
}

/// Loads and validates an exported grid configuration, then prints a
/// summary of it.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the file is missing, or the load
/// error if it is malformed or invalid.
pub fn cmd_config_import(path: &Path) -> Result<()> {
    let grid = GridConfig::import_json(path)?.ok_or_else(|| {
        Error::InvalidInput(format!("grid config '{}' not found", path.display()))
    })?;

    println!("Grid:       {}", grid.table_id);
    println!("Endpoint:   {}", grid.api_url);
    println!("Columns:    {}", grid.columns.join(", "));
    println!("Sortable:   {}", grid.sortable.join(", "));
    println!(
        "Page sizes: {} (default {})",
        grid.per_page_options
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        grid.default_per_page
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CellFormat, FieldConfig, TableConfig};
    use tempfile::TempDir;

    fn service_config() -> ServiceConfig {
        let mut config = ServiceConfig::new();
        config.api_path = "/grid".to_string();
        config.tables = vec![TableConfig {
            id: "orders".to_string(),
            table: "orders".to_string(),
            fields: vec![
                FieldConfig {
                    name: "id".to_string(),
                    label: Some("Order".to_string()),
                    format: CellFormat::Number,
                },
                FieldConfig {
                    name: "total".to_string(),
                    label: None,
                    format: CellFormat::Currency,
                },
            ],
            sortable: vec!["total".to_string()],
            searchable: None,
            per_page_options: Some(vec![10, 25]),
            default_per_page: Some(25),
        }];
        config
    }

    #[test]
    fn test_export_grid_config_uses_api_path() {
        let grid = export_grid_config(&service_config(), "orders").unwrap();
        assert_eq!(grid.api_url, "/grid");
        assert_eq!(grid.columns, vec!["id", "total"]);
        assert_eq!(grid.default_per_page, 25);
    }

    #[test]
    fn test_export_unknown_table() {
        let err = export_grid_config(&service_config(), "missing").unwrap_err();
        assert!(matches!(err, Error::UnknownTable(_)));
    }

    #[test]
    fn test_export_then_import() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("orders.json");
        cmd_config_export(&service_config(), "orders", &path).unwrap();
        assert!(cmd_config_import(&path).is_ok());
    }

    #[test]
    fn test_import_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = cmd_config_import(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_show_serializes() {
        assert!(cmd_config_show(&service_config()).is_ok());
    }
}
