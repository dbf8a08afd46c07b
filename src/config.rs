use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://bijou.db, postgres://...)
    pub database_url: String,

    /// Signing secret for access tokens.
    ///
    /// Must differ from `refresh_token_secret` so leaking one does not
    /// compromise the other.
    pub access_token_secret: String,

    /// Signing secret for refresh tokens.
    pub refresh_token_secret: String,

    /// Access token lifetime in seconds (default: 1 hour)
    pub access_token_ttl_secs: i64,

    /// Refresh token lifetime in seconds (default: 15 days)
    pub refresh_token_ttl_secs: i64,

    /// Google OAuth client ID — the expected `aud` of incoming ID tokens.
    /// Sign-in with Google is disabled when unset.
    pub google_client_id: Option<String>,

    /// Server host (default: 127.0.0.1)
    pub server_host: String,

    /// Server port (default: 3000)
    pub server_port: u16,

    /// Environment: development, production, test
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://bijou-auth.db?mode=rwc".to_string()),
            access_token_secret: std::env::var("ACCESS_TOKEN_SECRET")
                .unwrap_or_else(|_| "bijou-dev-access-secret-change-me".to_string()),
            refresh_token_secret: std::env::var("REFRESH_TOKEN_SECRET")
                .unwrap_or_else(|_| "bijou-dev-refresh-secret-change-me".to_string()),
            access_token_ttl_secs: std::env::var("ACCESS_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600),
            refresh_token_ttl_secs: std::env::var("REFRESH_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "1296000".to_string())
                .parse()
                .unwrap_or(1_296_000),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").ok(),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }

    /// Check if running in production mode. Controls the `Secure` cookie flag.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
