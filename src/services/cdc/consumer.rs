//! Kafka consume loop for CDC events.

use std::sync::Arc;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::handler::EventHandler;
use super::models::ChangeEvent;
use crate::config::KafkaConfig;
use crate::error::{AppError, Result};

/// CDC consumer.
///
/// Pulls messages one at a time, decodes them and dispatches each to the
/// handler before fetching the next, so in-flight work is bounded to one
/// message. Per-message failures are logged and skipped; only the shutdown
/// signal ends the loop.
pub struct CdcConsumer {
    consumer: StreamConsumer,
    handler: Arc<dyn EventHandler>,
    shutdown_rx: watch::Receiver<bool>,
}

impl CdcConsumer {
    pub fn new(
        config: &KafkaConfig,
        handler: Arc<dyn EventHandler>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("auto.offset.reset", &config.offset_reset)
            .set("isolation.level", &config.isolation_level)
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "5000")
            .set("session.timeout.ms", "30000")
            .create()
            .map_err(|e| {
                error!(error = %e, "failed to create Kafka consumer");
                AppError::Kafka(e)
            })?;

        consumer.subscribe(&[&config.topic]).map_err(|e| {
            error!(error = %e, topic = %config.topic, "failed to subscribe");
            AppError::Kafka(e)
        })?;

        info!(
            brokers = %config.brokers,
            topic = %config.topic,
            group_id = %config.group_id,
            "CDC consumer initialized"
        );

        Ok(Self {
            consumer,
            handler,
            shutdown_rx,
        })
    }

    /// Run the consume loop until the shutdown signal flips.
    ///
    /// Consumes `self`: the stream connection is released exactly once,
    /// when this returns.
    pub async fn run(mut self) -> Result<()> {
        info!("starting CDC consume loop");

        loop {
            tokio::select! {
                _ = self.shutdown_rx.changed() => {
                    if *self.shutdown_rx.borrow() {
                        info!("shutdown signal received, stopping consumer");
                        break;
                    }
                }

                // recv() is cancel-safe, so losing the race to the
                // shutdown branch never drops a message.
                result = self.consumer.recv() => {
                    match result {
                        Ok(msg) => {
                            self.process_message(msg.payload(), msg.offset()).await;
                        }
                        Err(e) => {
                            // Fetch errors are never fatal to the loop.
                            error!(error = %e, "Kafka consumer error");
                        }
                    }
                }
            }
        }

        self.consumer.unsubscribe();
        info!("CDC consumer stopped");
        Ok(())
    }

    /// Decode and dispatch one message. Errors are isolated here: they are
    /// logged with context and the message is skipped.
    async fn process_message(&self, payload: Option<&[u8]>, offset: i64) {
        let Some(payload) = payload else {
            debug!(offset, "empty message payload, skipping");
            return;
        };

        let event = match ChangeEvent::decode(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, offset, "failed to decode CDC payload, skipping");
                return;
            }
        };

        debug!(op = ?event.operation(), offset, "dispatching change event");

        if let Err(e) = self.handler.handle(&event).await {
            error!(error = %e, op = ?event.operation(), offset, "handler failed");
        }
    }
}
