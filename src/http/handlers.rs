use std::time::Instant;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::GridState;
use crate::models::{GridQueryParams, GridResponse};
use crate::observability::{RequestContext, current_request_id, enter_request_context};
use crate::{Error, Result};

/// `GET {api_path}`
pub async fn grid_page(
    State(state): State<GridState>,
    params: std::result::Result<Query<GridQueryParams>, QueryRejection>,
) -> Response {
    let start = Instant::now();
    let result = match params {
        Ok(Query(params)) => load_page(&state, params).await,
        Err(rejection) => Err(Error::InvalidInput(rejection.body_text())),
    };

    let status = if result.is_ok() { "success" } else { "error" };
    metrics::counter!("grid_requests_total", "status" => status).increment(1);
    metrics::histogram!("grid_request_duration_ms", "status" => status)
        .record(start.elapsed().as_secs_f64() * 1000.0);

    match result {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => failure(&e, state.expose_errors),
    }
}

/// `GET {api_path}/config`
pub async fn grid_config(
    State(state): State<GridState>,
    params: std::result::Result<Query<GridQueryParams>, QueryRejection>,
) -> Response {
    let result = params
        .map_err(|rejection| Error::InvalidInput(rejection.body_text()))
        .and_then(|Query(params)| state.registry.resolve(params.table_id()?));

    match result {
        Ok(table) => Json(table.grid.clone()).into_response(),
        Err(e) => failure(&e, state.expose_errors),
    }
}

async fn load_page(state: &GridState, params: GridQueryParams) -> Result<GridResponse> {
    let table = state.registry.resolve(params.table_id()?)?;
    let request = params.into_request(table.source.default_per_page)?;

    let provider = state.provider.clone();
    let span = tracing::Span::current();
    let request_id = current_request_id();

    tokio::task::spawn_blocking(move || {
        let _span = span.enter();
        let _context = request_id.map(|id| enter_request_context(RequestContext::from_id(id)));
        provider.fetch_page(&table.source, &request)
    })
    .await
    .map_err(|e| Error::OperationFailed {
        operation: "fetch_page_task".to_string(),
        cause: e.to_string(),
    })?
}

/// Logs the full error and answers with a `success: false` envelope whose
/// message is safe to show the caller.
fn failure(err: &Error, expose_errors: bool) -> Response {
    let status = match err {
        Error::UnknownTable(_) => StatusCode::NOT_FOUND,
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if err.is_client_error() {
        tracing::warn!(error = %err, status = status.as_u16(), "Rejected grid request");
    } else {
        tracing::error!(error = %err, status = status.as_u16(), "Grid request failed");
    }

    (
        status,
        Json(GridResponse::failure(err.public_message(expose_errors))),
    )
        .into_response()
}
