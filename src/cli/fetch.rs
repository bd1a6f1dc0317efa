//! Fetch CLI command.
//!
//! Drives a [`GridController`] against a running endpoint and prints the
//! rendered grid.
//!
//! # Usage
//!
//! ```bash
//! # Second page of users, sorted by name descending
//! tablegrid fetch --url http://127.0.0.1:8080/api/table --table users \
//!     --page 2 --sort name --desc
//!
//! # Search, rendered as JSON
//! tablegrid fetch --url http://127.0.0.1:8080/api/table --table users \
//!     --search smith --output json
//! ```

// CLI commands are allowed to use println! for output
#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use crate::client::{GridBody, GridController, GridView, HttpTransport, MemoryPreferences};
use crate::config::GridConfig;
use crate::models::SortDirection;
use crate::{Error, Result};

/// Output format for the fetch command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Rendered HTML fragment.
    #[default]
    Html,
    /// The view model as JSON.
    Json,
}

impl OutputFormat {
    /// Parses output format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Html,
        }
    }
}

/// Arguments for the `fetch` command.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Grid endpoint URL.
    pub url: String,
    /// Table identifier.
    pub table: String,
    /// Local grid configuration; fetched from the server when absent.
    pub grid_config: Option<PathBuf>,
    /// Page to show.
    pub page: Option<i64>,
    /// Sort field.
    pub sort: Option<String>,
    /// Sort descending.
    pub desc: bool,
    /// Search text.
    pub search: Option<String>,
    /// Page size.
    pub per_page: Option<i64>,
    /// Output format.
    pub output: OutputFormat,
}

/// Fetches one grid page and prints it.
///
/// # Errors
///
/// Returns an error if the grid configuration cannot be obtained or the
/// endpoint answers with a failure.
pub async fn cmd_fetch(options: FetchOptions) -> Result<()> {
    let view = fetch_view(options.clone()).await?;
    println!("{}", render(&view, options.output)?);

    if let GridBody::Error { message } = &view.body {
        return Err(Error::OperationFailed {
            operation: "fetch_grid".to_string(),
            cause: message.clone(),
        });
    }
    Ok(())
}

/// Loads the grid described by `options` and returns its view.
///
/// # Errors
///
/// Returns an error if the grid configuration cannot be obtained.
pub async fn fetch_view(options: FetchOptions) -> Result<GridView> {
    let transport = HttpTransport::new(&options.url)?;
    let config = match &options.grid_config {
        Some(path) => GridConfig::import_json(path)?.ok_or_else(|| {
            Error::InvalidInput(format!("grid config '{}' not found", path.display()))
        })?,
        None => transport.fetch_config(&options.table).await?,
    };
    if config.table_id != options.table {
        return Err(Error::InvalidInput(format!(
            "grid config is for table '{}', not '{}'",
            config.table_id, options.table
        )));
    }

    let grid = GridController::new(config, transport, MemoryPreferences::new())?;
    grid.with_session(|session| {
        if let Some(per_page) = options.per_page {
            session.set_per_page(per_page);
        }
        if let Some(field) = options.sort {
            let dir = if options.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            session.set_sort(field, dir);
        }
        if let Some(search) = options.search {
            session.set_search_text(search);
        }
        if let Some(page) = options.page {
            session.set_page(page);
        }
    });

    grid.load().await;
    Ok(grid.view())
}

fn render(view: &GridView, output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Html => Ok(view.to_html()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(view).map_err(|e| Error::OperationFailed {
                operation: "serialize_view".to_string(),
                cause: e.to_string(),
            })
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("json", OutputFormat::Json; "json")]
    #[test_case("JSON", OutputFormat::Json; "uppercase")]
    #[test_case("html", OutputFormat::Html; "html")]
    #[test_case("whatever", OutputFormat::Html; "fallback")]
    fn test_output_format_parse(input: &str, expected: OutputFormat) {
        assert_eq!(OutputFormat::parse(input), expected);
    }

    #[tokio::test]
    async fn test_missing_local_config_is_invalid_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let options = FetchOptions {
            url: "http://127.0.0.1:9/api/table".to_string(),
            table: "users".to_string(),
            grid_config: Some(dir.path().join("missing.json")),
            ..FetchOptions::default()
        };
        let err = fetch_view(options).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_local_config_for_other_table_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("orders.json");
        GridConfig::new("orders")
            .add_field("id", "ID")
            .export_json(&path)
            .unwrap();

        let options = FetchOptions {
            url: "http://127.0.0.1:9/api/table".to_string(),
            table: "users".to_string(),
            grid_config: Some(path),
            ..FetchOptions::default()
        };
        let err = fetch_view(options).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_renders_error_view() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        GridConfig::new("users")
            .add_field("id", "ID")
            .export_json(&path)
            .unwrap();

        let options = FetchOptions {
            url: "http://127.0.0.1:9/api/table".to_string(),
            table: "users".to_string(),
            grid_config: Some(path),
            ..FetchOptions::default()
        };
        let view = fetch_view(options).await.unwrap();
        assert!(matches!(view.body, GridBody::Error { .. }));
        assert!(view.to_html().contains("tablegrid-error"));
    }
}
