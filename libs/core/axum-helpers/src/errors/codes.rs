//! Error codes attached to every failure that reaches the error handler.
//!
//! The string form travels in log records (`error.code`) so dashboards can
//! group failures without parsing messages; the numeric code keeps the
//! client / server / database ranges apart.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request payload failed schema validation
    ValidationError,

    /// Body was not valid JSON or had the wrong shape
    InvalidJson,

    /// Query string could not be decoded
    InvalidQuery,

    /// Requested resource or route does not exist
    NotFound,

    /// Bearer credentials missing or rejected
    Unauthorized,

    // Server errors
    /// Unexpected failure, including handler panics
    InternalError,

    // Database errors (2000-2999)
    /// Store-level failure surfaced from a repository
    DatabaseError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidJson => "INVALID_JSON",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }

    /// Numeric code for monitoring. 1xxx are request errors, 2xxx store errors.
    pub const fn code(&self) -> u32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidJson => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::Unauthorized => 1006,
            Self::InvalidQuery => 1012,
            Self::DatabaseError => 2003,
        }
    }

    pub const fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Validation failed",
            Self::InvalidJson => "Invalid JSON body",
            Self::InvalidQuery => "Invalid query string",
            Self::NotFound => "Resource not found",
            Self::Unauthorized => "Authentication required",
            Self::InternalError | Self::DatabaseError => "Internal server error",
        }
    }

    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::InternalError | Self::DatabaseError)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ranges_separate_client_and_store_errors() {
        assert_eq!(ErrorCode::NotFound.code(), 1004);
        assert_eq!(ErrorCode::DatabaseError.code(), 2003);
        assert!(ErrorCode::DatabaseError.is_server_error());
        assert!(!ErrorCode::ValidationError.is_server_error());
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::DatabaseError).unwrap();
        assert_eq!(json, "\"DATABASE_ERROR\"");
        assert_eq!(ErrorCode::InvalidQuery.to_string(), "INVALID_QUERY");
    }

    #[test]
    fn server_errors_share_generic_message() {
        assert_eq!(
            ErrorCode::DatabaseError.default_message(),
            ErrorCode::InternalError.default_message()
        );
    }
}
