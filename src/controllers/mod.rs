use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::GoogleTokenVerifier;
use crate::config::Config;

/// Shared application state available in all handlers.
///
/// The Google verifier is a capability handed in at startup, not a
/// module-level singleton.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub google: Arc<dyn GoogleTokenVerifier>,
}

pub mod auth;
