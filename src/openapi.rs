use utoipa::OpenApi;

use crate::controllers::auth::{
    AuthResponse, GoogleAuthRequest, GoogleAuthResponse, LoginRequest, MessageResponse,
    RefreshResponse, RegisterRequest,
};
use crate::models::user::UserResponse;

/// OpenAPI documentation for the auth service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bijou Auth API",
        version = "0.1.0",
        description = "Session token manager for the Bijou jewelry marketplace."
    ),
    paths(
        crate::controllers::auth::register,
        crate::controllers::auth::login,
        crate::controllers::auth::refresh,
        crate::controllers::auth::logout,
        crate::controllers::auth::google_auth,
        crate::controllers::auth::google_auth_failure,
        crate::controllers::auth::me,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            GoogleAuthRequest,
            AuthResponse,
            RefreshResponse,
            GoogleAuthResponse,
            MessageResponse,
            UserResponse,
        )
    ),
    tags(
        (name = "auth", description = "Authentication and session endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add JWT Bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
