//! JSON extractor that validates and normalizes the payload in one step.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;

/// A raw request payload that knows how to check itself and produce the
/// normalized value handlers work with.
///
/// Implementations report *every* violation, not just the first one.
pub trait ValidatePayload: DeserializeOwned {
    type Validated;

    fn validate_payload(self) -> Result<Self::Validated, Vec<String>>;
}

/// JSON extractor with validation.
///
/// Deserializes the body as `T`, runs [`ValidatePayload::validate_payload`]
/// and hands the handler the normalized `T::Validated`.
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::{ValidatePayload, ValidatedJson};
///
/// async fn create(ValidatedJson(input): ValidatedJson<CreateProductPayload>) -> String {
///     format!("Creating {}", input.name)
/// }
/// ```
pub struct ValidatedJson<T: ValidatePayload>(pub T::Validated);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: ValidatePayload,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await?;

        payload
            .validate_payload()
            .map(ValidatedJson)
            .map_err(AppError::Validation)
    }
}
