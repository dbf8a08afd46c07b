use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::Config;

/// Name of the refresh-token cookie.
pub const REFRESH_COOKIE: &str = "jwt";

/// Build the refresh cookie: HttpOnly, SameSite=Strict, Secure in
/// production, Max-Age = refresh TTL. This is the only transport the
/// refresh token ever uses.
pub fn build_refresh_cookie(token: &str, config: &Config) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token.to_owned()))
        .path("/")
        .http_only(true)
        .secure(config.is_production())
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(config.refresh_token_ttl_secs))
        .build()
}

/// Build the matching removal cookie (same attributes, Max-Age 0).
pub fn clear_refresh_cookie(config: &Config) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(config.is_production())
        .same_site(SameSite::Strict)
        .max_age(time::Duration::ZERO)
        .build()
}
