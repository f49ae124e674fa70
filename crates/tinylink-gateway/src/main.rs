use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tinylink_gateway::cli::{Cli, StorageBackendArg};
use tinylink_gateway::{App, AppState};
use tinylink_generator::TokenGenerator;
use tinylink_redirector::{CachedRepository, MokaUrlCache, RedirectorService};
use tinylink_shortener::{ShortenerService, ShortenerSettings};
use tinylink_storage::{InMemoryRepository, Repository, SqliteRepository, TimeoutRepository};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tinylink_telemetry::init(cli.log_format.into(), &cli.log_level)?;

    info!(
        listen_addr = %cli.listen_addr,
        base_url = %cli.base_url,
        storage_backend = %cli.storage,
        max_attempts = cli.max_attempts,
        "starting tinylink"
    );

    match cli.storage {
        StorageBackendArg::InMemory => serve(cli, InMemoryRepository::new()).await,
        StorageBackendArg::Sqlite => {
            let repository = SqliteRepository::connect(&cli.sqlite_url)
                .await
                .with_context(|| format!("failed to open sqlite database {}", cli.sqlite_url))?;
            repository.migrate().await?;
            serve(cli, repository).await
        }
    }
}

async fn serve<R: Repository>(cli: Cli, repository: R) -> anyhow::Result<()> {
    let store = Arc::new(TimeoutRepository::new(
        repository,
        Duration::from_millis(cli.store_timeout_ms),
    ));

    let settings = ShortenerSettings::builder()
        .max_attempts(cli.max_attempts)
        .build();
    let shortener =
        ShortenerService::with_settings(Arc::clone(&store), TokenGenerator::default(), settings);
    let redirector = RedirectorService::new(CachedRepository::new(
        store,
        MokaUrlCache::with_capacity(cli.cache_capacity),
    ));

    let state = AppState::new(Arc::new(shortener), Arc::new(redirector), cli.base_url);
    let router = App::router(state);

    let listener = tokio::net::TcpListener::bind(cli.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
