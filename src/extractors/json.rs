use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::AuthServiceError;

/// Strict JSON extractor whose rejection follows the service error envelope.
///
/// A malformed or incomplete body is a 422 `Validation` failure rather than
/// axum's default 400 plain-text rejection.
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AuthServiceError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX)
            .await
            .map_err(|e| AuthServiceError::Validation(format!("Failed to read body: {e}")))?;

        let value: T = serde_json::from_slice(&bytes)
            .map_err(|e| AuthServiceError::Validation(format!("Invalid JSON: {e}")))?;

        Ok(Json(value))
    }
}

impl<T: serde::Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, axum::Json(self.0)).into_response()
    }
}
