//! Connection pool and transaction boundary.
//!
//! `Database::with_transaction` is the only sanctioned way to mutate the
//! store: the unit of work receives the live transaction handle, and the
//! mutation queries in [`crate::db::products`] only accept that handle.

use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use tracing::{debug, error};

use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};

/// Active transaction handle passed into units of work.
pub type PgTx = Transaction<'static, Postgres>;

/// Create the connection pool from configuration.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.url)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to connect to PostgreSQL");
            AppError::Database(e)
        })?;

    Ok(pool)
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run `work` inside a single transaction.
    ///
    /// Commit on `Ok`, rollback on `Err`. A rollback failure is logged but
    /// never replaces the error that triggered it. A commit failure is
    /// escalated as [`AppError::Commit`]: reporting success for work whose
    /// durability is unknown would be worse than a retry under
    /// at-least-once delivery.
    pub async fn with_transaction<T, F>(&self, work: F) -> Result<T>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut PgTx) -> BoxFuture<'t, Result<T>> + Send,
    {
        let mut tx = self.pool.begin().await?;

        match work(&mut tx).await {
            Ok(value) => {
                tx.commit().await.map_err(|e| {
                    error!(error = %e, "failed to commit transaction");
                    AppError::Commit(e)
                })?;
                debug!("transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "failed to roll back transaction");
                }
                Err(err)
            }
        }
    }
}
