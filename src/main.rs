//! tracker-profile server binary.

use std::error::Error;
use std::sync::Arc;

use http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use tracker_profile::adapters::auth::JwtSessionValidator;
use tracker_profile::adapters::http::{build_router, AuthState, ProfileHandlers};
use tracker_profile::adapters::profile::{InMemoryProfileRepository, PostgresProfileRepository};
use tracker_profile::application::{GetProfileHandler, UpdateProfileHandler};
use tracker_profile::config::{AppConfig, LogFormat, ServerConfig};
use tracker_profile::ports::ProfileRepository;

type BoxError = Box<dyn Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    let repository = profile_repository(&config).await?;
    let validator: AuthState = Arc::new(JwtSessionValidator::from_config(&config.auth)?);
    tracing::info!(issuer = %config.auth.issuer, "Token validation configured");

    let handlers = ProfileHandlers::new(
        Arc::new(GetProfileHandler::new(repository.clone())),
        Arc::new(UpdateProfileHandler::new(repository)),
    );
    let app = build_router(handlers, validator)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.server));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Profile API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match server.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// PostgreSQL when `database.url` is set, in-memory otherwise.
async fn profile_repository(config: &AppConfig) -> Result<Arc<dyn ProfileRepository>, BoxError> {
    if !config.database.is_configured() {
        tracing::warn!("No database configured, profiles are kept in memory");
        return Ok(Arc::new(InMemoryProfileRepository::new()));
    }

    let repository = PostgresProfileRepository::connect(&config.database).await?;
    if config.database.run_migrations {
        repository.migrate().await?;
        tracing::info!("Database migrations applied");
    }
    Ok(Arc::new(repository))
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(&origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() && !server.is_production() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
