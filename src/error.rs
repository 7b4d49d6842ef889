use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed CDC payload. Recoverable: the message is skipped.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Transport-level consumer failure. Recoverable: the loop continues.
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// The store rejected an operation. Triggers rollback at the
    /// transaction boundary.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// COMMIT itself failed. Kept distinct from `Database` so callers can
    /// tell "work rejected" from "durability ambiguous".
    #[error("Transaction commit failed: {0}")]
    Commit(#[source] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
