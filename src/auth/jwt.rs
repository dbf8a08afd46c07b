use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::AuthServiceError;
use crate::models::user;

/// Access token claims. Carried on every authorized request; never stored
/// server-side.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct AccessClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
}

/// Refresh token claims. Identity only — everything else is re-read from the
/// user record at rotation time.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct RefreshClaims {
    /// Subject (user ID)
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

/// A freshly minted access/refresh pair. Issuance has no side effects;
/// persisting the refresh token on the user record is the caller's job.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Create an access token carrying `{id, email, role}`.
pub fn create_access_token(
    user_id: i32,
    email: &str,
    role: &str,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, AuthServiceError> {
    let now = Utc::now();
    let expires = now + Duration::seconds(ttl_secs);

    let claims = AccessClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        iat: now.timestamp() as usize,
        exp: expires.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthServiceError::Internal(format!("failed to create access token: {e}")))
}

/// Create a refresh token carrying only the user id.
pub fn create_refresh_token(
    user_id: i32,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, AuthServiceError> {
    let now = Utc::now();
    let expires = now + Duration::seconds(ttl_secs);

    let claims = RefreshClaims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: expires.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthServiceError::Internal(format!("failed to create refresh token: {e}")))
}

/// Mint a token pair for an authenticated user. Access and refresh tokens
/// are signed with distinct secrets.
pub fn issue_token_pair(
    user: &user::Model,
    config: &Config,
) -> Result<TokenPair, AuthServiceError> {
    let access_token = create_access_token(
        user.id,
        &user.email,
        &user.role,
        &config.access_token_secret,
        config.access_token_ttl_secs,
    )?;
    let refresh_token = create_refresh_token(
        user.id,
        &config.refresh_token_secret,
        config.refresh_token_ttl_secs,
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Validate an access token and return its claims.
pub fn verify_access_token(token: &str, secret: &str) -> Result<AccessClaims, AuthServiceError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| AuthServiceError::Unauthorized(format!("Invalid token: {e}")))?;

    Ok(token_data.claims)
}

/// Validate a refresh token, narrowing the failure by cause so clients get a
/// precise (but non-leaking) message.
pub fn verify_refresh_token(token: &str, secret: &str) -> Result<RefreshClaims, AuthServiceError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AuthServiceError::Unauthorized("Refresh token expired".to_string())
        }
        _ => AuthServiceError::Unauthorized("Invalid refresh token".to_string()),
    })
}
