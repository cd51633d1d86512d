use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use indexer::config::Config;
use indexer::db::Database;
use indexer::sync::{DelegationsClient, SyncManager};
use indexer::tzkt::TzktClient;
use indexer::utils::{config_logger, logger, retry::RetryPolicy};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logger::init_logger();
    info!("Starting Tezos delegations indexer");

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;
    config_logger::log_config(&config);

    // Initialize database connection
    let db = Database::connect_with_retry(
        &config.database_url,
        config.db_max_connections,
        RetryPolicy::new(config.retry_delay, config.max_retries),
    )
    .await
    .context("Failed to connect to database")?
    .migrate()
    .await?;
    info!("Database connection established and migrations applied");

    let tzkt = TzktClient::new(&config.tzkt_base_url, config.http_timeout)
        .context("Failed to create TzKT client")?;
    info!("Using TzKT API at {}", tzkt.base_url());

    let client = DelegationsClient::new(Arc::new(tzkt), Arc::new(db));

    let cancel = CancellationToken::new();
    let worker = SyncManager::new(client)
        .with_interval(config.worker_interval)
        .start(cancel.clone());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown requested, stopping {}", worker.name());

    cancel.cancel();
    match worker.join().await {
        Ok(()) => info!("Indexer shutdown gracefully"),
        Err(e) => error!("Worker task failed: {}", e),
    }

    Ok(())
}
