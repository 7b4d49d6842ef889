//! CDC (Change Data Capture) ingestion.
//!
//! Consumes Debezium change events for the products table and applies them
//! to the local PostgreSQL copy.
//!
//! - **Models**: wire structures and the decoded [`ChangeEvent`]
//! - **Consumer**: the consume loop with cooperative shutdown
//! - **Handler**: mapping from an event to transactional store operations

pub mod consumer;
pub mod handler;
pub mod models;

pub use consumer::CdcConsumer;
pub use handler::{DeletePolicy, EventHandler, LoggingEventHandler, ProductSyncHandler};
pub use models::{CdcOperation, ChangeEvent, ProductImage};
