pub mod codes;
pub mod handlers;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Message returned to clients for every 5xx. The detail only goes to the log.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Envelope returned for every failed request.
///
/// # JSON Example
///
/// ```json
/// {
///   "success": false,
///   "status": 400,
///   "message": "Validation failed",
///   "errors": ["\"name\" is required", "\"price\" is required"]
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// HTTP status code, repeated in the body
    #[schema(example = 404)]
    pub status: u16,
    /// Human-readable summary
    #[schema(example = "Product not found")]
    pub message: String,
    /// Individual violations, present only for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status: status.as_u16(),
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Application error type that can be converted to HTTP responses.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryExtractorRejection(#[from] QueryRejection),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(validation_messages(&errors))
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Oversized or unreadable bodies keep their own status; every other
            // body problem is a client input error.
            AppError::JsonExtractorRejection(JsonRejection::BytesRejection(e)) => e.status(),
            AppError::JsonExtractorRejection(_) => StatusCode::BAD_REQUEST,
            AppError::QueryExtractorRejection(e) => e.status(),
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::JsonExtractorRejection(_) => ErrorCode::InvalidJson,
            AppError::QueryExtractorRejection(_) => ErrorCode::InvalidQuery,
            AppError::Validation(_) | AppError::BadRequest(_) => ErrorCode::ValidationError,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error.code = %code, error_code = code.code(), "JSON extraction error: {}", e);
                ErrorResponse::new(status, ErrorCode::ValidationError.default_message())
                    .with_errors(vec![e.body_text()])
            }
            AppError::QueryExtractorRejection(e) => {
                tracing::warn!(error.code = %code, error_code = code.code(), "Query extraction error: {}", e);
                ErrorResponse::new(status, ErrorCode::ValidationError.default_message())
                    .with_errors(vec![e.body_text()])
            }
            AppError::Validation(errors) => {
                tracing::info!(error.code = %code, error_code = code.code(), ?errors, "Validation error");
                ErrorResponse::new(status, code.default_message()).with_errors(errors)
            }
            AppError::BadRequest(msg) => {
                tracing::info!(error.code = %code, "Bad request: {}", msg);
                ErrorResponse::new(status, msg)
            }
            AppError::Unauthorized(msg) => {
                tracing::info!(error.code = %code, "Unauthorized: {}", msg);
                ErrorResponse::new(status, msg)
            }
            AppError::NotFound(msg) => {
                tracing::info!(error.code = %code, error_code = code.code(), "Not found: {}", msg);
                ErrorResponse::new(status, msg)
            }
            AppError::Database(detail) | AppError::InternalServerError(detail) => {
                tracing::error!(error.code = %code, error_code = code.code(), detail = %detail, "Unhandled error");
                ErrorResponse::new(status, INTERNAL_ERROR_MESSAGE)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Flattens `validator` output into one message per violation.
///
/// Messages come from the `message` attribute on each rule; a rule without one
/// falls back to `"<field>" is invalid`. Fields are visited in name order so
/// the list is stable between runs.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter()
                .map(|err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("\"{field}\" is invalid"),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
