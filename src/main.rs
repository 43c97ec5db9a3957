mod models;
mod handlers;
mod services;
mod middleware;
mod config;
mod errors;
mod routes;
mod state;

use anyhow::Context;
use std::sync::Arc;
use crate::{
    config::{Config, StoreBackend},
    services::{accounts, MemoryStore, RedisStore, Store},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize basic tracing subscriber
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize the document store
    let store: Arc<dyn Store> = match config.store.backend {
        StoreBackend::Redis => {
            let url = config.store.redis_url.as_str();
            let client = redis::Client::open(url).context("Invalid Redis URL")?;
            let store = RedisStore::connect(client)
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("Using Redis store at {}", url);
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Make sure the static account exists
    accounts::seed_account(
        store.as_ref(),
        &config.auth.seed_username,
        &config.auth.seed_password,
    )
    .await
    .context("Failed to seed account")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = routes::build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server running on {}", addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler, run until killed
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
