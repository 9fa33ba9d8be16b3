//! Custom extractors for Axum handlers.
//!
//! Both extractors reject with [`AppError`](crate::errors::AppError), so a bad
//! body or query string produces the same envelope as every other failure.

pub mod api_query;
pub mod validated_json;

pub use api_query::ApiQuery;
pub use validated_json::{ValidatePayload, ValidatedJson};
