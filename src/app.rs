use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::auth::{GoogleJwksVerifier, GoogleSignInDisabled, GoogleTokenVerifier};
use crate::config::Config;
use crate::controllers::{self, AppState};
use crate::migrations::Migrator;
use crate::openapi::ApiDoc;

/// The auth service application.
pub struct App {
    pub config: Config,
    pub db: DatabaseConnection,
    google: Arc<dyn GoogleTokenVerifier>,
}

impl App {
    /// Create the application from environment configuration.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env()?;
        Self::with_config(config).await
    }

    /// Create the application with a given config. The Google verifier is
    /// built from `GOOGLE_CLIENT_ID`; sign-in with Google stays disabled
    /// when it is unset.
    pub async fn with_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let google: Arc<dyn GoogleTokenVerifier> = match &config.google_client_id {
            Some(client_id) => Arc::new(GoogleJwksVerifier::new(client_id.clone())),
            None => {
                tracing::warn!("GOOGLE_CLIENT_ID not set; Google sign-in disabled");
                Arc::new(GoogleSignInDisabled)
            }
        };
        Self::with_verifier(config, google).await
    }

    /// Create the application with an explicit Google verifier. Used by the
    /// test harness to substitute a fake.
    pub async fn with_verifier(
        config: Config,
        google: Arc<dyn GoogleTokenVerifier>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let db = crate::db::connect(&config).await?;
        Ok(App { config, db, google })
    }

    /// Run pending database migrations.
    pub async fn run_migrations(&self) -> Result<(), sea_orm::DbErr> {
        tracing::info!("Running pending database migrations...");
        Migrator::up(&self.db, None).await?;
        tracing::info!("Migrations complete.");
        Ok(())
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        let config = Arc::new(self.config.clone());
        let is_dev = self.config.is_dev();

        let state = AppState {
            db: self.db.clone(),
            config: config.clone(),
            google: self.google.clone(),
        };

        let openapi_spec = ApiDoc::openapi();
        let openapi_spec_clone = openapi_spec.clone();

        let mut router = Router::new()
            .route("/", get(welcome))
            .nest("/api/auth", controllers::auth::routes())
            .with_state(state);

        router = router
            .merge(Scalar::with_url("/api-docs", openapi_spec))
            .route(
                "/api-docs/openapi.json",
                get(move || {
                    let spec = openapi_spec_clone.clone();
                    async move { axum::Json(spec) }
                }),
            )
            .layer(axum::Extension(config))
            .layer(CorsLayer::permissive());

        // Request tracing and ids carry real cost; development only.
        if is_dev {
            use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse};
            use tower_http::LatencyUnit;

            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                );
        }

        router
    }

    /// Migrate and serve until ctrl-c.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        self.run_migrations().await?;

        let addr = self.config.server_addr();
        let router = self.router();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("listening on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install ctrl-c handler: {}", e);
    }
    tracing::info!("shutdown signal received");
}

async fn welcome() -> &'static str {
    "bijou-auth is running. API docs at /api-docs"
}
