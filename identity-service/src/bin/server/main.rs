use std::sync::Arc;

use anyhow::Context;
use auth::Authenticator;
use auth::PasswordHasher;
use axum::http::HeaderValue;
use chrono::Duration;
use identity_service::config::Config;
use identity_service::config::StorageBackend;
use identity_service::identity::ports::IdentityServicePort;
use identity_service::identity::service::IdentityService;
use identity_service::inbound::http::router::create_router;
use identity_service::repositories::InMemoryCredentialStore;
use identity_service::repositories::PostgresCredentialStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        cors_origin = ?config.server.cors_origin,
        token_ttl_minutes = config.jwt.ttl_minutes,
        storage = ?config.storage.backend,
        "Configuration loaded"
    );

    let password_hasher = PasswordHasher::with_cost(
        config.password.memory_cost_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;
    let authenticator = Arc::new(
        Authenticator::new(
            config.jwt.secret.as_bytes(),
            Duration::minutes(config.jwt.ttl_minutes),
        )
        .with_password_hasher(password_hasher),
    );

    let identity_service: Arc<dyn IdentityServicePort> = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!(
                storage = "memory",
                "Using in-memory credential store; identities are lost on restart"
            );
            Arc::new(IdentityService::new(
                Arc::new(InMemoryCredentialStore::new()),
                Arc::clone(&authenticator),
            ))
        }
        StorageBackend::Postgres => {
            let database_url = config
                .storage
                .database_url
                .as_deref()
                .context("storage.database_url is not set")?;

            let pg_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            tracing::info!(
                max_connections = 5,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            Arc::new(IdentityService::new(
                Arc::new(PostgresCredentialStore::new(pg_pool)),
                Arc::clone(&authenticator),
            ))
        }
    };

    let cors_origin = config
        .server
        .cors_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()
        .context("server.cors_origin is not a valid header value")?;

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(identity_service, authenticator, cors_origin);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
