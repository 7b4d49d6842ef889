//! Event handlers: map a decoded change event to store operations.

use async_trait::async_trait;
use tracing::{info, warn};

use super::models::{CdcOperation, ChangeEvent, ProductImage};
use crate::db::{products, Database};
use crate::error::{AppError, Result};
use crate::models::{product::parse_price, NewProduct};

/// Seam between the consume loop and the target store. Implementations
/// must keep any multi-step mutation inside one transaction.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &ChangeEvent) -> Result<()>;
}

/// Observation-only handler: logs the event and applies nothing. Useful
/// for wiring up a new topic before the sync mapping is enabled.
pub struct LoggingEventHandler;

#[async_trait]
impl EventHandler for LoggingEventHandler {
    async fn handle(&self, event: &ChangeEvent) -> Result<()> {
        info!(
            op = ?event.operation(),
            before = ?event.before(),
            after = ?event.after(),
            "received change event"
        );
        Ok(())
    }
}

/// What a CDC delete does to the materialized row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Set the delete marker, keep the row.
    Soft,
    /// Physically remove the row.
    Hard,
}

/// Production handler: applies each event to the products table inside a
/// single transaction.
pub struct ProductSyncHandler {
    db: Database,
    delete_policy: DeletePolicy,
}

impl ProductSyncHandler {
    pub fn new(db: Database, delete_policy: DeletePolicy) -> Self {
        Self { db, delete_policy }
    }

    async fn apply_create(&self, image: &ProductImage) -> Result<()> {
        let record = to_new_product(image)?;
        let created = self
            .db
            .with_transaction(move |tx| Box::pin(async move { products::create(tx, &record).await }))
            .await?;

        info!(id = created.id, name = %created.name, "applied create");
        Ok(())
    }

    async fn apply_update(&self, image: &ProductImage) -> Result<()> {
        let id = image.id;
        let record = to_new_product(image)?;
        let rows = self
            .db
            .with_transaction(move |tx| {
                Box::pin(async move { products::update(tx, id, &record).await })
            })
            .await?;

        if rows == 0 {
            // Row never materialized here; skip rather than wedge the
            // partition on a message that can never apply.
            warn!(id, "update matched no rows");
        } else {
            info!(id, "applied update");
        }
        Ok(())
    }

    async fn apply_delete(&self, image: &ProductImage) -> Result<()> {
        let id = image.id;
        let policy = self.delete_policy;
        let rows = self
            .db
            .with_transaction(move |tx| {
                Box::pin(async move {
                    match policy {
                        DeletePolicy::Soft => products::soft_delete(tx, id).await,
                        DeletePolicy::Hard => products::hard_delete(tx, id).await,
                    }
                })
            })
            .await?;

        if rows == 0 {
            warn!(id, ?policy, "delete matched no rows");
        } else {
            info!(id, ?policy, "applied delete");
        }
        Ok(())
    }
}

#[async_trait]
impl EventHandler for ProductSyncHandler {
    async fn handle(&self, event: &ChangeEvent) -> Result<()> {
        match event.operation() {
            CdcOperation::Create => {
                let image = required_image(event.after(), "after")?;
                self.apply_create(image).await
            }
            CdcOperation::Update => {
                let image = required_image(event.after(), "after")?;
                self.apply_update(image).await
            }
            CdcOperation::Delete => {
                let image = required_image(event.before(), "before")?;
                self.apply_delete(image).await
            }
            CdcOperation::Unknown => {
                warn!("unknown CDC operation, skipping event");
                Ok(())
            }
        }
    }
}

fn required_image<'a>(
    image: Option<&'a ProductImage>,
    which: &str,
) -> Result<&'a ProductImage> {
    image.ok_or_else(|| AppError::Validation(format!("event missing '{which}' image")))
}

fn to_new_product(image: &ProductImage) -> Result<NewProduct> {
    NewProduct::new(image.name.clone(), parse_price(&image.price)?, image.stock)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str, price: &str, stock: i64) -> ProductImage {
        let raw = serde_json::json!({
            "id": 1,
            "name": name,
            "price": price,
            "stock": stock,
        });
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_to_new_product() {
        let record = to_new_product(&image("Apple", "100", 10)).unwrap();
        assert_eq!(record.name, "Apple");
        assert_eq!(record.price, 100.0);
        assert_eq!(record.stock, 10);
    }

    #[test]
    fn test_to_new_product_rejects_opaque_price() {
        assert!(to_new_product(&image("Apple", "AMTI", 10)).is_err());
    }

    #[test]
    fn test_to_new_product_rejects_negative_stock() {
        assert!(to_new_product(&image("Apple", "1", -5)).is_err());
    }
}
