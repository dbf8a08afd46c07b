use axum::http::StatusCode;
use thiserror::Error;

use crate::response::FailBody;

/// Standard error type for the auth service.
///
/// Every fallible operation returns this; the single transport boundary is
/// the `IntoResponse` impl below, which renders the `{status:"fail"}`
/// envelope with the matching HTTP status code.
#[derive(Debug, Error)]
pub enum AuthServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl AuthServiceError {
    /// Get the HTTP status code for this error.
    ///
    /// Conflict maps to 400 (not 409): the federation-collision response is
    /// part of the public contract consumed by the storefront client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthServiceError::Conflict(_) => StatusCode::BAD_REQUEST,
            AuthServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server-side failures are logged in full but
    /// collapse to a generic message in the response body.
    fn client_message(&self) -> String {
        match self {
            AuthServiceError::Internal(_) | AuthServiceError::Database(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AuthServiceError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = FailBody {
            status: "fail",
            message: self.client_message(),
        };
        (status, axum::Json(body)).into_response()
    }
}
