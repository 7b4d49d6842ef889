use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inventory_sync::config::Config;
use inventory_sync::db::{connect_pool, Database};
use inventory_sync::services::cdc::{CdcConsumer, DeletePolicy, ProductSyncHandler};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,inventory_sync=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("starting inventory-sync");

    let config = Config::from_env().context("failed to load configuration")?;

    let pool = connect_pool(&config.database)
        .await
        .context("failed to create database pool")?;

    if config.database.migrate {
        tracing::info!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
    }

    let db = Database::new(pool);
    let handler = Arc::new(ProductSyncHandler::new(db, DeletePolicy::Soft));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = CdcConsumer::new(&config.kafka, handler, shutdown_rx)
        .context("failed to create CDC consumer")?;

    let consumer_task = tokio::spawn(consumer.run());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown signal received");

    shutdown_tx
        .send(true)
        .context("failed to signal consumer shutdown")?;

    consumer_task
        .await
        .context("consumer task panicked")?
        .context("consumer exited with error")?;

    tracing::info!("inventory-sync stopped");
    Ok(())
}
