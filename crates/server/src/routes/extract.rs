//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::services::auth::ValidationErrors;

/// JSON body extractor whose rejection is a validation failure.
///
/// A missing content type, malformed JSON or a body of the wrong shape all
/// answer with the standard `400 Validation failed` envelope instead of
/// axum's plain-text rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(%rejection, "Rejected request body");
                Err(AppError::Validation(ValidationErrors::single(
                    "body",
                    "Request body must be a valid JSON object",
                )))
            }
        }
    }
}
