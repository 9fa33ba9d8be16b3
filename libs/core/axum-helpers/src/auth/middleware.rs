use super::jwt::{AuthError, JwtAuth};
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

/// Pull the token from `Authorization: Bearer <token>`, falling back to an
/// `access_token` cookie.
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        cookie
                            .trim()
                            .split_once('=')
                            .filter(|(name, _)| *name == "access_token")
                            .map(|(_, value)| value)
                    })
                })
        })
}

/// Authorization gate for mutating routes.
///
/// Rejects with 401 before the handler runs, so nothing reaches the store for
/// an unauthenticated request. On success the [`JwtClaims`](super::JwtClaims)
/// are inserted into the request extensions.
pub async fn require_auth(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = extract_token(request.headers())
        .ok_or(AuthError::MissingToken)
        .and_then(|token| auth.verify_token(token))
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected request without valid credentials");
            AppError::Unauthorized(match e {
                AuthError::MissingToken => "No token provided".to_string(),
                AuthError::InvalidToken(_) => "Invalid token".to_string(),
            })
        })?;

    tracing::debug!(sub = %claims.sub, "Authenticated request");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
