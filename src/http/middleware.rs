use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use crate::observability::{REQUEST_ID_HEADER, RequestContext, scope_request_context};

/// Assigns a request id, scopes it over the handler and echoes it in the
/// response.
pub async fn request_id(request: Request, next: Next) -> Response {
    let context = RequestContext::from_header(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    let id = context.request_id().to_string();
    let span = tracing::info_span!("grid_request", request_id = %id);

    let mut response = scope_request_context(context, next.run(request))
        .instrument(span)
        .await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
