//! One log record per request: method, path, status and latency.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Logs every request once the response is ready.
///
/// 5xx responses are logged at `error`, 4xx at `warn`, the rest at `info`.
/// The timestamp comes from the subscriber.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(%method, %path, %route, status = status.as_u16(), latency_ms, "request failed");
    } else if status.is_client_error() {
        tracing::warn!(%method, %path, %route, status = status.as_u16(), latency_ms, "request rejected");
    } else {
        tracing::info!(%method, %path, %route, status = status.as_u16(), latency_ms, "request completed");
    }

    response
}
