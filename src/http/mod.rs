//! HTTP surface of the grid.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET {api_path}?table=..&page=..&search=..&sort_field=..&sort_dir=..&per_page=..` | [`GridResponse`](crate::GridResponse) envelope |
//! | `GET {api_path}/config?table=..` | [`GridConfig`](crate::GridConfig) of a registered grid |
//!
//! Every failure, including an unknown table or a backing-store error, is
//! answered with a `success: false` envelope; nothing else crosses the
//! boundary.

mod handlers;
mod middleware;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::header;
use axum::routing::get;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::services::{DataProvider, TableRegistry};
use crate::{Error, Result};

/// Shared, read-only state of the endpoint.
#[derive(Debug, Clone)]
pub struct GridState {
    registry: Arc<TableRegistry>,
    provider: DataProvider,
    expose_errors: bool,
}

impl GridState {
    /// Creates endpoint state. Query errors are hidden behind a generic
    /// message unless `expose_errors` is set.
    #[must_use]
    pub fn new(registry: TableRegistry, provider: DataProvider, expose_errors: bool) -> Self {
        Self {
            registry: Arc::new(registry),
            provider,
            expose_errors,
        }
    }
}

/// Builds the router serving the grid and config routes under `api_path`.
///
/// # Errors
///
/// Returns [`Error::Validation`] if `api_path` is not an absolute path
/// without a trailing slash or route parameters.
pub fn router(state: GridState, api_path: &str) -> Result<Router> {
    if !api_path.starts_with('/')
        || api_path.len() < 2
        || api_path.ends_with('/')
        || api_path.contains(['{', '}', '*'])
    {
        return Err(Error::Validation(format!(
            "api path '{api_path}' is not a plain absolute path"
        )));
    }

    Ok(Router::new()
        .route(api_path, get(handlers::grid_page))
        .route(&format!("{api_path}/config"), get(handlers::grid_config))
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            header::HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-store"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Serves `app` on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the address cannot be bound or the
/// server fails.
pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "bind".to_string(),
            cause: format!("{addr}: {e}"),
        })?;

    tracing::info!(%addr, "Grid endpoint listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "serve".to_string(),
            cause: e.to_string(),
        })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down grid endpoint");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteGridBackend;

    fn state() -> GridState {
        let backend = SqliteGridBackend::in_memory().unwrap();
        GridState::new(
            TableRegistry::new(),
            DataProvider::new(Arc::new(backend)),
            false,
        )
    }

    #[test]
    fn test_router_rejects_unusable_paths() {
        for path in ["", "/", "api", "/api/", "/api/{table}", "/api/*rest"] {
            assert!(router(state(), path).is_err(), "{path}");
        }
    }

    #[test]
    fn test_router_accepts_nested_path() {
        assert!(router(state(), "/v1/grid").is_ok());
    }
}
