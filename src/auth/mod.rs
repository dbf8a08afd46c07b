pub mod cookie;
pub mod google;
pub mod jwt;
pub mod password;

pub use cookie::{build_refresh_cookie, clear_refresh_cookie, REFRESH_COOKIE};
pub use google::{GoogleIdentity, GoogleJwksVerifier, GoogleSignInDisabled, GoogleTokenVerifier};
pub use jwt::{
    create_access_token, create_refresh_token, issue_token_pair, verify_access_token,
    verify_refresh_token, AccessClaims, RefreshClaims, TokenPair,
};
pub use password::{hash_password, verify_password};
