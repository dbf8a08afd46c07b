use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{extract::State, routing::get, routing::post, Router};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{
    build_refresh_cookie, clear_refresh_cookie, hash_password, issue_token_pair,
    verify_password, verify_refresh_token, REFRESH_COOKIE,
};
use crate::error::AuthServiceError;
use crate::extractors::{AuthUser, Json};
use crate::models::user::{self, Entity as User, Role, UserResponse};
use crate::response::ApiResponse;

use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `customer`. `admin` cannot be self-assigned.
    pub role: Option<Role>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserResponse,
}

/// The rotated refresh token travels cookie-only and never appears here.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GoogleAuthRequest {
    /// The signed ID token from Google Identity Services.
    pub credential: String,
    /// Role for a first sign-in; ignored for existing accounts.
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GoogleAuthResponse {
    pub access_token: String,
    pub user: UserResponse,
    pub is_new_user: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/google", post(google_auth))
        .route("/google/failure", get(google_auth_failure))
        .route("/me", get(me))
}

// ── Helpers ──

fn requested_role(role: Option<Role>) -> Result<Role, AuthServiceError> {
    let role = role.unwrap_or(Role::Customer);
    if role == Role::Admin {
        return Err(AuthServiceError::Validation(
            "Cannot self-register as admin".to_string(),
        ));
    }
    Ok(role)
}

/// Persist the single live refresh token on the user record.
async fn store_refresh_token(
    db: &sea_orm::DatabaseConnection,
    user: user::Model,
    token: &str,
) -> Result<user::Model, AuthServiceError> {
    let mut active: user::ActiveModel = user.into();
    active.refresh_token = Set(Some(token.to_string()));
    active.updated_at = Set(Utc::now().naive_utc());
    Ok(active.update(db).await?)
}

// ── Handlers ──

/// Register a new password-based account.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<AuthResponse>),
        (status = 400, description = "Email already registered"),
        (status = 422, description = "Invalid input")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, AuthServiceError> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(AuthServiceError::Validation(
            "Name, email, and password are required".to_string(),
        ));
    }

    let role = requested_role(payload.role)?;
    let email = payload.email.trim().to_lowercase();

    let existing = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AuthServiceError::Conflict(
            "Email already registered".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;
    let now = Utc::now().naive_utc();

    let new_user = user::ActiveModel {
        email: Set(email),
        name: Set(payload.name.trim().to_string()),
        phone: Set(payload.phone),
        password_hash: Set(Some(password_hash)),
        role: Set(role.as_str().to_string()),
        google_id: Set(None),
        refresh_token: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    // A concurrent registration can slip past the lookup above; the unique
    // index on email is the arbiter.
    let user_model = match new_user.insert(&state.db).await {
        Ok(created) => created,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AuthServiceError::Conflict(
                "Email already registered".to_string(),
            ))
        }
        Err(e) => return Err(e.into()),
    };

    let pair = issue_token_pair(&user_model, &state.config)?;
    let user_model = store_refresh_token(&state.db, user_model, &pair.refresh_token).await?;

    tracing::info!(user_id = user_model.id, "account registered");

    let jar = jar.add(build_refresh_cookie(&pair.refresh_token, &state.config));
    Ok((
        jar,
        ApiResponse::created(AuthResponse {
            access_token: pair.access_token,
            user: UserResponse::from(user_model),
        }),
    )
        .into_response())
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponse>),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Missing email or password")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AuthServiceError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AuthServiceError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let email = payload.email.trim().to_lowercase();
    let user_model = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AuthServiceError::Unauthorized("Invalid email".to_string()))?;

    // Google-only accounts have no hash and can never pass password login.
    let stored_hash = user_model
        .password_hash
        .as_deref()
        .ok_or_else(|| AuthServiceError::Unauthorized("Invalid password".to_string()))?;

    if !verify_password(&payload.password, stored_hash)? {
        return Err(AuthServiceError::Unauthorized(
            "Invalid password".to_string(),
        ));
    }

    let pair = issue_token_pair(&user_model, &state.config)?;
    let user_model = store_refresh_token(&state.db, user_model, &pair.refresh_token).await?;

    tracing::debug!(user_id = user_model.id, "password login");

    let jar = jar.add(build_refresh_cookie(&pair.refresh_token, &state.config));
    Ok((
        jar,
        ApiResponse::success(AuthResponse {
            access_token: pair.access_token,
            user: UserResponse::from(user_model),
        }),
    )
        .into_response())
}

/// Rotate the refresh token and mint a new access token.
///
/// The presented token must equal the user's stored token; anything else is
/// a replay of a rotated-out value and is rejected. The overwrite is a
/// compare-and-swap on the old value, so two racing refreshes can only
/// produce one winner.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "New access token", body = ApiResponse<RefreshResponse>),
        (status = 401, description = "Missing, malformed, or expired refresh cookie"),
        (status = 403, description = "Rotated-out or unknown refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AuthServiceError> {
    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AuthServiceError::Unauthorized("Refresh token missing".to_string()))?;

    let claims = verify_refresh_token(&presented, &state.config.refresh_token_secret)?;
    let user_id: i32 = claims
        .sub
        .parse()
        .map_err(|_| AuthServiceError::Forbidden("Invalid refresh token".to_string()))?;

    let user_model = User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AuthServiceError::Forbidden("Invalid refresh token".to_string()))?;

    if user_model.refresh_token.as_deref() != Some(presented.as_str()) {
        tracing::warn!(user_id, "refresh token reuse detected");
        return Err(AuthServiceError::Forbidden(
            "Invalid refresh token".to_string(),
        ));
    }

    let pair = issue_token_pair(&user_model, &state.config)?;

    let result = User::update_many()
        .col_expr(
            user::Column::RefreshToken,
            Expr::value(pair.refresh_token.clone()),
        )
        .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
        .filter(user::Column::Id.eq(user_id))
        .filter(user::Column::RefreshToken.eq(&presented))
        .exec(&state.db)
        .await?;

    // Zero rows: a concurrent refresh or logout won the race.
    if result.rows_affected == 0 {
        return Err(AuthServiceError::Forbidden(
            "Invalid refresh token".to_string(),
        ));
    }

    let jar = jar.add(build_refresh_cookie(&pair.refresh_token, &state.config));
    Ok((
        jar,
        ApiResponse::success(RefreshResponse {
            access_token: pair.access_token,
        }),
    )
        .into_response())
}

/// Revoke the current session.
///
/// Idempotent: an absent cookie is a 204 no-op, and a cookie matching no
/// user still clears the cookie and reports success.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session revoked", body = ApiResponse<MessageResponse>),
        (status = 204, description = "No session to revoke")
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AuthServiceError> {
    let Some(presented) = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string()) else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    if let Some(user_model) = User::find()
        .filter(user::Column::RefreshToken.eq(&presented))
        .one(&state.db)
        .await?
    {
        let user_id = user_model.id;
        let mut active: user::ActiveModel = user_model.into();
        active.refresh_token = Set(None);
        active.updated_at = Set(Utc::now().naive_utc());
        active.update(&state.db).await?;
        tracing::debug!(user_id, "session revoked");
    }

    let jar = jar.add(clear_refresh_cookie(&state.config));
    Ok((
        jar,
        ApiResponse::success(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
        .into_response())
}

/// Sign in with a Google ID token.
///
/// An email already held by a password account (or by a different Google
/// subject) is an identity collision and is rejected, never merged.
#[utoipa::path(
    post,
    path = "/api/auth/google",
    request_body = GoogleAuthRequest,
    responses(
        (status = 200, description = "Signed in", body = ApiResponse<GoogleAuthResponse>),
        (status = 400, description = "Email already registered with different method"),
        (status = 401, description = "Credential failed verification")
    ),
    tag = "auth"
)]
pub async fn google_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<GoogleAuthRequest>,
) -> Result<Response, AuthServiceError> {
    let identity = state.google.verify(&payload.credential).await?;
    let email = identity.email.trim().to_lowercase();

    let existing = User::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?;

    let (user_model, is_new_user) = match existing {
        None => {
            let role = requested_role(payload.role)?;
            let now = Utc::now().naive_utc();
            let new_user = user::ActiveModel {
                email: Set(email),
                name: Set(identity.name.clone()),
                phone: Set(None),
                password_hash: Set(None),
                role: Set(role.as_str().to_string()),
                google_id: Set(Some(identity.subject_id.clone())),
                refresh_token: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            };
            let created = new_user.insert(&state.db).await?;
            tracing::info!(user_id = created.id, "account created via Google sign-in");
            (created, true)
        }
        Some(found) => match found.google_id.as_deref() {
            Some(bound) if bound == identity.subject_id => (found, false),
            // Password account, or a different Google subject claiming the
            // same address: reject instead of merging identities.
            _ => {
                return Err(AuthServiceError::Conflict(
                    "Email already registered with different method".to_string(),
                ))
            }
        },
    };

    let pair = issue_token_pair(&user_model, &state.config)?;
    let user_model = store_refresh_token(&state.db, user_model, &pair.refresh_token).await?;

    let jar = jar.add(build_refresh_cookie(&pair.refresh_token, &state.config));
    Ok((
        jar,
        ApiResponse::success(GoogleAuthResponse {
            access_token: pair.access_token,
            user: UserResponse::from(user_model),
            is_new_user,
        }),
    )
        .into_response())
}

/// Error sink for the storefront's Google sign-in redirect.
#[utoipa::path(
    get,
    path = "/api/auth/google/failure",
    responses((status = 401, description = "Google authentication failed")),
    tag = "auth"
)]
pub async fn google_auth_failure() -> AuthServiceError {
    AuthServiceError::Unauthorized("Google authentication failed".to_string())
}

/// Return the authenticated user's own profile.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserResponse>),
        (status = 401, description = "Missing or invalid access token")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiResponse<UserResponse>, AuthServiceError> {
    let user_model = User::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AuthServiceError::NotFound("User not found".to_string()))?;

    Ok(ApiResponse::success(UserResponse::from(user_model)))
}
