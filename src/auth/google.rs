use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::error::AuthServiceError;

const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Identity extracted from a verified Google ID token.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    pub email: String,
    pub subject_id: String,
    pub name: String,
    pub picture: Option<String>,
}

/// Verifier for Google ID tokens, injected into the app state so tests can
/// substitute a fake. Constructed once at process start.
#[async_trait]
pub trait GoogleTokenVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<GoogleIdentity, AuthServiceError>;
}

#[derive(Debug, Deserialize)]
struct GoogleIdClaims {
    sub: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

/// Production verifier: checks RS256 signatures against Google's published
/// JWKS, with audience pinned to our OAuth client id.
pub struct GoogleJwksVerifier {
    client_id: String,
    http: reqwest::Client,
    // Google rotates keys rarely; cache the set for an hour.
    keys: RwLock<Option<(Instant, JwkSet)>>,
}

impl GoogleJwksVerifier {
    pub fn new(client_id: impl Into<String>) -> Self {
        GoogleJwksVerifier {
            client_id: client_id.into(),
            http: reqwest::Client::new(),
            keys: RwLock::new(None),
        }
    }

    async fn jwks(&self) -> Result<JwkSet, AuthServiceError> {
        if let Some((fetched_at, set)) = self.keys.read().await.as_ref() {
            if fetched_at.elapsed() < JWKS_CACHE_TTL {
                return Ok(set.clone());
            }
        }

        let set: JwkSet = self
            .http
            .get(GOOGLE_CERTS_URL)
            .send()
            .await
            .map_err(|e| AuthServiceError::Internal(format!("failed to fetch Google JWKS: {e}")))?
            .json()
            .await
            .map_err(|e| AuthServiceError::Internal(format!("invalid Google JWKS body: {e}")))?;

        *self.keys.write().await = Some((Instant::now(), set.clone()));
        Ok(set)
    }
}

#[async_trait]
impl GoogleTokenVerifier for GoogleJwksVerifier {
    async fn verify(&self, credential: &str) -> Result<GoogleIdentity, AuthServiceError> {
        let header = decode_header(credential)
            .map_err(|_| AuthServiceError::Unauthorized("Invalid Google credential".to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthServiceError::Unauthorized("Invalid Google credential".to_string()))?;

        let jwks = self.jwks().await?;
        let jwk = jwks
            .find(&kid)
            .ok_or_else(|| AuthServiceError::Unauthorized("Invalid Google credential".to_string()))?;
        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| AuthServiceError::Internal(format!("unusable Google JWK: {e}")))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&["https://accounts.google.com", "accounts.google.com"]);

        let claims = decode::<GoogleIdClaims>(credential, &key, &validation)
            .map_err(|_| AuthServiceError::Unauthorized("Invalid Google credential".to_string()))?
            .claims;

        Ok(GoogleIdentity {
            name: claims.name.unwrap_or_else(|| claims.email.clone()),
            email: claims.email,
            subject_id: claims.sub,
            picture: claims.picture,
        })
    }
}

/// Placeholder installed when `GOOGLE_CLIENT_ID` is unset. Every credential
/// is rejected.
pub struct GoogleSignInDisabled;

#[async_trait]
impl GoogleTokenVerifier for GoogleSignInDisabled {
    async fn verify(&self, _credential: &str) -> Result<GoogleIdentity, AuthServiceError> {
        Err(AuthServiceError::Unauthorized(
            "Google sign-in is not configured".to_string(),
        ))
    }
}
