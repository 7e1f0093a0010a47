use std::sync::Arc;

use auth::Argon2Hasher;
use auth::Authenticator;
use auth::KeyProvider;
use auth::StoreCredentialVerifier;
use auth::TokenService;
use auth::UserStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::Config;
use user_service::inbound::http::router::create_router;
use user_service::repositories::InMemoryUserStore;
use user_service::repositories::PostgresUserStore;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        token_ttl_seconds = config.jwt.expiration_seconds,
        persistent = config.database.url.is_some(),
        "Configuration loaded"
    );

    let keys = KeyProvider::from_settings(config.jwt.secret.as_deref())?;
    let tokens = Arc::new(TokenService::new(&keys));

    match config.database.url.as_deref() {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            serve(Arc::new(PostgresUserStore::new(pg_pool)), tokens, &config).await
        }
        None => {
            tracing::warn!("No database configured, users are kept in memory");
            serve(Arc::new(InMemoryUserStore::new()), tokens, &config).await
        }
    }
}

async fn serve<S: UserStore>(
    store: Arc<S>,
    tokens: Arc<TokenService>,
    config: &Config,
) -> Result<(), anyhow::Error> {
    let token_ttl = config.jwt.token_ttl()?;
    let hasher = Arc::new(Argon2Hasher::new());
    let verifier = Arc::new(StoreCredentialVerifier::new(
        Arc::clone(&store),
        Arc::clone(&hasher),
    )?);
    let authenticator = Arc::new(Authenticator::new(
        verifier,
        hasher,
        Arc::clone(&store),
        tokens,
        token_ttl,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(authenticator, store)).await?;

    tracing::info!("Server exited successfully");
    Ok(())
}
