use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub kafka: KafkaConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KafkaConfig {
    #[serde(default = "default_kafka_brokers")]
    pub brokers: String,

    #[serde(default = "default_kafka_topic")]
    pub topic: String,

    #[serde(default = "default_kafka_group_id")]
    pub group_id: String,

    /// Where to start when the group has no committed offset
    /// ("earliest" or "latest").
    #[serde(default = "default_offset_reset")]
    pub offset_reset: String,

    /// "read_committed" so aborted upstream transactions are never seen.
    #[serde(default = "default_isolation_level")]
    pub isolation_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,

    /// Run pending migrations at startup.
    #[serde(default = "default_db_migrate")]
    pub migrate: bool,
}

// Default value functions
fn default_kafka_brokers() -> String {
    "localhost:9092".to_string()
}

fn default_kafka_topic() -> String {
    "dbserver1.public.products".to_string()
}

fn default_kafka_group_id() -> String {
    "inventory-sync-v1".to_string()
}

fn default_offset_reset() -> String {
    "earliest".to_string()
}

fn default_isolation_level() -> String {
    "read_committed".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_migrate() -> bool {
    true
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv::dotenv().ok();

        let kafka = KafkaConfig {
            brokers: env::var("KAFKA_BROKERS").unwrap_or_else(|_| default_kafka_brokers()),
            topic: env::var("KAFKA_TOPIC").unwrap_or_else(|_| default_kafka_topic()),
            group_id: env::var("KAFKA_GROUP_ID").unwrap_or_else(|_| default_kafka_group_id()),
            offset_reset: env::var("KAFKA_OFFSET_RESET")
                .unwrap_or_else(|_| default_offset_reset()),
            isolation_level: env::var("KAFKA_ISOLATION_LEVEL")
                .unwrap_or_else(|_| default_isolation_level()),
        };

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL").map_err(|_| {
                crate::error::AppError::Config("DATABASE_URL must be set".to_string())
            })?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_db_max_connections),
            migrate: env::var("DATABASE_MIGRATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_db_migrate),
        };

        Ok(Config { kafka, database })
    }
}
