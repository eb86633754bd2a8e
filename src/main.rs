//! Panurge application entry point.
//!
//! Bootstraps the server:
//! 1. Load configuration from environment
//! 2. Connect to Postgres and create the users table if needed
//! 3. Connect to Redis
//! 4. Build router with security headers and request logging
//! 5. Start Axum server

use panurge::{
    auth::AppState,
    config::Config,
    routes,
    storage::{session::RedisSessionCache, user::PgCredentialStore},
    templates::HtmlTemplates,
};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize tracing with env filter support (RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    tracing::info!("Starting panurge on {}", config.bind_addr);

    // Postgres: durable user records
    let credentials =
        PgCredentialStore::connect(&config.database_url, config.database_max_connections).await?;
    credentials.ensure_schema().await?;
    tracing::info!("Connected to Postgres");

    // Redis: session tokens. Verify the connection before serving.
    let redis_client = redis::Client::open(config.redis_url.as_str())?;
    redis_client.get_multiplexed_async_connection().await?;
    tracing::info!("Connected to Redis");

    let bind_addr = config.bind_addr;
    let state = AppState::new(
        Arc::new(credentials),
        Arc::new(RedisSessionCache::new(redis_client)),
        Arc::new(HtmlTemplates),
        Arc::new(config),
    );

    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
