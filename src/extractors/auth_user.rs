use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::verify_access_token;
use crate::config::Config;
use crate::error::AuthServiceError;

/// Extractor that validates the bearer access token and provides the
/// authenticated user ID.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn my_handler(AuthUser(user_id): AuthUser) -> impl IntoResponse {
///     // user_id is the authenticated user's ID
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub i32);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AuthServiceError::Unauthorized("Missing Authorization header".to_string())
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AuthServiceError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        // Arc<Config> is injected as a request extension at router build time.
        let config = parts.extensions.get::<Arc<Config>>().ok_or_else(|| {
            AuthServiceError::Internal("Config not found in request".to_string())
        })?;

        let claims = verify_access_token(token, &config.access_token_secret)?;

        let user_id: i32 = claims.sub.parse().map_err(|_| {
            AuthServiceError::Unauthorized("Invalid user ID in token".to_string())
        })?;

        Ok(AuthUser(user_id))
    }
}
