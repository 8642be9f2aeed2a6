//! Request body extraction with field validation

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;

use super::error::{ApiError, ApiOperation};
use crate::domain::Validate;

/// JSON body that passed [`Validate`]
///
/// Malformed JSON is a 400 `INVALID_REQUEST`. JSON that does not fit `T`
/// (unknown enum variant, wrong type, missing field) and a body that fails
/// validation are a 400 `VALIDATION_ERROR` listing every failed field.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value.validate()?;
        Ok(Self(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            ApiError::validation_failed(ApiOperation::Create, vec![err.body_text()])
        }
        other => ApiError::bad_request(other.body_text()),
    }
}
