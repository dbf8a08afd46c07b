use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

/// Standard success envelope.
///
/// All endpoints return this format:
/// ```json
/// {
///   "status": "success",
///   "data": { ... }
/// }
/// ```
///
/// Failures are rendered by `AuthServiceError` as
/// `{"status": "fail", "message": "..."}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub data: T,
    #[serde(skip)]
    code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a 200 OK success response.
    pub fn success(data: T) -> Self {
        ApiResponse {
            status: "success",
            data,
            code: StatusCode::OK,
        }
    }

    /// Create a 201 Created success response.
    pub fn created(data: T) -> Self {
        ApiResponse {
            status: "success",
            data,
            code: StatusCode::CREATED,
        }
    }
}

impl<T: Serialize> axum::response::IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let code = self.code;
        (code, axum::Json(self)).into_response()
    }
}

/// Failure envelope body, emitted only by the error boundary.
#[derive(Debug, Serialize, ToSchema)]
pub struct FailBody {
    pub status: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let res = ApiResponse::success(serde_json::json!({"ok": true}));
        let body = serde_json::to_value(&res).unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["ok"], true);
        assert!(body.get("code").is_none());
    }
}
