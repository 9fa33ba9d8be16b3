//! Strips query-operator keys from incoming requests before any handler sees
//! them.
//!
//! A key is an operator key when, after percent-decoding, it starts with `$`
//! or contains `.` (or uses the `field[$op]` bracket form). Such keys are
//! dropped from the query string and, recursively, from JSON object bodies.
//! Bodies that are not valid JSON pass through unchanged so the JSON extractor
//! can report them.

use crate::errors::AppError;
use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{
        HeaderValue, Uri,
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        uri::PathAndQuery,
    },
    middleware::Next,
    response::Response,
};
use serde_json::Value;

/// Largest body the sanitizer will buffer.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

pub fn is_operator_key(key: &str) -> bool {
    key.starts_with('$') || key.contains('.') || key.contains("[$")
}

/// Remove operator pairs from a raw query string.
pub fn sanitize_query(query: &str) -> String {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let raw_key = pair.split_once('=').map_or(*pair, |(k, _)| k);
            let key = urlencoding::decode(raw_key)
                .map(|k| k.into_owned())
                .unwrap_or_else(|_| raw_key.to_owned());
            if is_operator_key(&key) {
                tracing::warn!(key = %key, "Dropped operator key from query string");
                false
            } else {
                true
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Remove operator keys from every object inside `value`.
/// Returns `true` if anything was removed.
pub fn strip_operator_keys(value: &mut Value) -> bool {
    match value {
        Value::Object(map) => {
            let before = map.len();
            map.retain(|key, _| {
                let keep = !is_operator_key(key);
                if !keep {
                    tracing::warn!(key = %key, "Dropped operator key from request body");
                }
                keep
            });
            let mut changed = map.len() != before;
            for nested in map.values_mut() {
                changed |= strip_operator_keys(nested);
            }
            changed
        }
        Value::Array(items) => items
            .iter_mut()
            .fold(false, |changed, item| strip_operator_keys(item) | changed),
        _ => false,
    }
}

fn rewrite_query(uri: &Uri) -> Result<Option<Uri>, AppError> {
    let Some(query) = uri.query() else {
        return Ok(None);
    };

    let cleaned = sanitize_query(query);
    if cleaned == query {
        return Ok(None);
    }

    let path_and_query = if cleaned.is_empty() {
        uri.path().to_owned()
    } else {
        format!("{}?{}", uri.path(), cleaned)
    };

    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(
        PathAndQuery::try_from(path_and_query)
            .map_err(|e| AppError::BadRequest(format!("Invalid request URI: {e}")))?,
    );
    Uri::from_parts(parts)
        .map(Some)
        .map_err(|e| AppError::BadRequest(format!("Invalid request URI: {e}")))
}

fn is_json(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json") || ct.contains("+json"))
}

/// Middleware entry point.
pub async fn sanitize_input(mut request: Request, next: Next) -> Result<Response, AppError> {
    if let Some(uri) = rewrite_query(request.uri())? {
        *request.uri_mut() = uri;
    }

    if !is_json(&request) {
        return Ok(next.run(request).await);
    }

    let (mut parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read request body: {e}")))?;

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(mut value) => {
            if strip_operator_keys(&mut value) {
                let cleaned = serde_json::to_vec(&value)
                    .map_err(|e| AppError::InternalServerError(e.to_string()))?;
                parts
                    .headers
                    .insert(CONTENT_LENGTH, HeaderValue::from(cleaned.len()));
                Body::from(cleaned)
            } else {
                Body::from(bytes)
            }
        }
        Err(_) => Body::from(bytes),
    };

    Ok(next.run(Request::from_parts(parts, body)).await)
}
