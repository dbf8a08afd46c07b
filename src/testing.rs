use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;

use crate::auth::{GoogleIdentity, GoogleTokenVerifier};
use crate::config::Config;
use crate::error::AuthServiceError;

/// A test application builder for integration testing.
///
/// Spins up the auth service with an in-memory SQLite database and a fake
/// Google verifier that accepts plain-JSON credentials:
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_login() {
///     let app = TestApp::new().await;
///     let res = app
///         .client
///         .post(&app.url("/api/auth/login"), r#"{"email":"a@b.com","password":"secret"}"#)
///         .await;
///     assert_eq!(res.status, 401);
/// }
/// ```
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: TestClient,
    pub db: DatabaseConnection,
    pub config: Config,
}

/// Fake verifier used by [`TestApp`]: the "credential" is a JSON object
/// `{"email", "sub", "name", "picture"}`. Anything unparsable is rejected
/// exactly like a bad signature.
pub struct FakeGoogleVerifier;

#[async_trait]
impl GoogleTokenVerifier for FakeGoogleVerifier {
    async fn verify(&self, credential: &str) -> Result<GoogleIdentity, AuthServiceError> {
        let value: serde_json::Value = serde_json::from_str(credential)
            .map_err(|_| AuthServiceError::Unauthorized("Invalid Google credential".to_string()))?;

        let email = value["email"]
            .as_str()
            .ok_or_else(|| AuthServiceError::Unauthorized("Invalid Google credential".to_string()))?
            .to_string();
        let subject_id = value["sub"]
            .as_str()
            .ok_or_else(|| AuthServiceError::Unauthorized("Invalid Google credential".to_string()))?
            .to_string();

        Ok(GoogleIdentity {
            name: value["name"].as_str().unwrap_or(&email).to_string(),
            picture: value["picture"].as_str().map(|s| s.to_string()),
            email,
            subject_id,
        })
    }
}

impl TestApp {
    /// Create a new test app with an in-memory SQLite database.
    pub async fn new() -> Self {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            access_token_secret: "test-access-secret".to_string(),
            refresh_token_secret: "test-refresh-secret".to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 1_296_000,
            google_client_id: Some("test-client-id".to_string()),
            server_host: "127.0.0.1".to_string(),
            server_port: 0, // OS assigns a random port
            environment: "test".to_string(),
        };

        Self::with_config(config).await
    }

    /// Create a new test app with a custom config.
    pub async fn with_config(config: Config) -> Self {
        let app = crate::App::with_verifier(config.clone(), Arc::new(FakeGoogleVerifier))
            .await
            .expect("Failed to create test app");

        app.run_migrations()
            .await
            .expect("Failed to run migrations");

        let router = app.router();
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = TestClient::new(addr);

        TestApp {
            addr,
            client,
            db: app.db,
            config: app.config,
        }
    }

    /// Get the base URL for the test server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Register a user and return (access token, refresh cookie pair).
    pub async fn register_user(&self, name: &str, email: &str, password: &str) -> (String, String) {
        let body = serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
        });

        let res = self
            .client
            .post(&self.url("/api/auth/register"), &body.to_string())
            .await;

        assert_eq!(
            res.status, 201,
            "Register failed with status {}: {}",
            res.status, res.body
        );

        let token = res.data()["access_token"].as_str().unwrap().to_string();
        let cookie = res.refresh_cookie().expect("register did not set cookie");
        (token, cookie)
    }

    /// Login and return (access token, refresh cookie pair).
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let res = self
            .client
            .post(&self.url("/api/auth/login"), &body.to_string())
            .await;

        assert_eq!(res.status, 200, "Login failed: {}", res.body);

        let token = res.data()["access_token"].as_str().unwrap().to_string();
        let cookie = res.refresh_cookie().expect("login did not set cookie");
        (token, cookie)
    }
}

/// A simple HTTP test client with helper methods. Cookies are passed
/// explicitly so rotation tests can replay stale values.
#[derive(Clone)]
pub struct TestClient {
    inner: reqwest::Client,
    base_addr: SocketAddr,
}

impl TestClient {
    /// Create a new test client pointing at the given address.
    pub fn new(addr: SocketAddr) -> Self {
        TestClient {
            inner: reqwest::Client::new(),
            base_addr: addr,
        }
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&self, url: &str, body: &str) -> TestResponse {
        let res = self
            .inner
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a POST request carrying a `name=value` cookie pair.
    pub async fn post_with_cookie(&self, url: &str, cookie: &str) -> TestResponse {
        let res = self
            .inner
            .post(url)
            .header("Cookie", cookie)
            .send()
            .await
            .expect("POST request failed");
        TestResponse::from_response(res).await
    }

    /// Send a GET request with a bearer token.
    pub async fn get_with_auth(&self, url: &str, token: &str) -> TestResponse {
        let res = self
            .inner
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Send a GET request.
    pub async fn get(&self, url: &str) -> TestResponse {
        let res = self.inner.get(url).send().await.expect("GET request failed");
        TestResponse::from_response(res).await
    }

    /// Get the base URL.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.base_addr)
    }
}

/// A simplified HTTP response for test assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub body: String,
    pub headers: HeaderMap,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let body = res.text().await.unwrap_or_default();
        TestResponse {
            status,
            body,
            headers,
        }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Failed to parse response as JSON")
    }

    /// Check if the response envelope indicates success.
    pub fn is_success(&self) -> bool {
        self.json()["status"] == "success"
    }

    /// Get the data field from the response.
    pub fn data(&self) -> serde_json::Value {
        self.json()["data"].clone()
    }

    /// Get the failure message from the response.
    pub fn message(&self) -> String {
        self.json()["message"].as_str().unwrap_or_default().to_string()
    }

    /// The raw `Set-Cookie` header for the refresh cookie, attributes and all.
    pub fn refresh_cookie_raw(&self) -> Option<String> {
        self.headers
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("jwt="))
            .map(|v| v.to_string())
    }

    /// The refresh cookie as a `jwt=<value>` pair, ready to send back.
    pub fn refresh_cookie(&self) -> Option<String> {
        self.refresh_cookie_raw()
            .and_then(|raw| raw.split(';').next().map(|s| s.to_string()))
    }
}
