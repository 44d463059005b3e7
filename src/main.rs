//! mileage-service server entry point.
//!
//! Loads configuration, opens the selected store, and serves the REST API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use mileage_service::api;
use mileage_service::app_state::AppState;
use mileage_service::config::{LogFormat, MileageConfig, StorageBackend};
use mileage_service::persistence::{MemoryStore, PostgresStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = MileageConfig::from_env().context("invalid configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        backend = %config.storage_backend,
        "starting mileage-service"
    );

    // Build persistence layer
    let store: Arc<dyn Store> = match config.storage_backend {
        StorageBackend::Postgres => {
            let store = PostgresStore::connect(&config)
                .await
                .context("failed to connect to PostgreSQL")?;
            if config.database_run_migrations {
                store.migrate().await.context("failed to run migrations")?;
                tracing::info!("database migrations applied");
            }
            Arc::new(store)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Build application
    let app = api::app(
        AppState::new(store),
        Duration::from_secs(config.request_timeout_secs),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
