//! Consumer shutdown behavior. No broker required: the signal arrives
//! before the first fetch, so the loop must exit without consuming.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use inventory_sync::config::KafkaConfig;
use inventory_sync::services::cdc::{CdcConsumer, LoggingEventHandler};

fn test_config() -> KafkaConfig {
    KafkaConfig {
        // Port intentionally points at nothing; the consumer must not
        // need a live broker to honor shutdown.
        brokers: "127.0.0.1:19092".to_string(),
        topic: "dbserver1.public.products".to_string(),
        group_id: "inventory-sync-test".to_string(),
        offset_reset: "earliest".to_string(),
        isolation_level: "read_committed".to_string(),
    }
}

#[tokio::test]
async fn signaled_consumer_stops_without_fetching() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = CdcConsumer::new(&test_config(), Arc::new(LoggingEventHandler), shutdown_rx)
        .expect("consumer builds without broker connectivity");

    // Signal before the loop starts: the first iteration must take the
    // stopping path instead of blocking on a fetch.
    shutdown_tx.send(true).expect("receiver alive");

    let result = tokio::time::timeout(Duration::from_secs(10), consumer.run()).await;
    result
        .expect("consumer stopped promptly after shutdown signal")
        .expect("clean shutdown");
}

#[tokio::test]
async fn signal_mid_iteration_stops_the_loop() {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = CdcConsumer::new(&test_config(), Arc::new(LoggingEventHandler), shutdown_rx)
        .expect("consumer builds without broker connectivity");

    let task = tokio::spawn(consumer.run());

    // Let the loop park on its suspension points, then signal.
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown_tx.send(true).expect("receiver alive");

    let result = tokio::time::timeout(Duration::from_secs(10), task).await;
    result
        .expect("consumer stopped promptly after shutdown signal")
        .expect("task joined")
        .expect("clean shutdown");
}
