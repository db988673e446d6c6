//! Kafka consumer that archives user events.
//!
//! Each message is decoded with the wire codec and handed to a
//! [`UserEventLog`] sink. Undecodable messages are logged and committed so
//! they are not redelivered; sink failures leave the offset uncommitted.

use crate::codec::decode;
use crate::error::{EventBusError, Result};
use crate::producer::KafkaSettings;
use directory_core::UserEventLog;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// What to do with a message's offset after handling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Commit,
    Retain,
}

/// Decodes payloads and forwards them to the sink.
#[derive(Clone)]
pub struct UserEventHandler {
    sink: Arc<dyn UserEventLog>,
}

impl UserEventHandler {
    pub fn new(sink: Arc<dyn UserEventLog>) -> Self {
        Self { sink }
    }

    pub async fn handle(&self, payload: Option<&[u8]>) -> Disposition {
        let Some(payload) = payload else {
            warn!("Skipping user event message without payload");
            return Disposition::Commit;
        };

        let event = match decode(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Skipping undecodable user event");
                return Disposition::Commit;
            }
        };

        match self.sink.save(&event).await {
            Ok(()) => {
                debug!(event_id = %event.id, "Saved user event");
                Disposition::Commit
            }
            Err(e) => {
                error!(event_id = %event.id, error = %e, "Failed to save user event");
                Disposition::Retain
            }
        }
    }
}

pub struct UserEventConsumer {
    consumer: StreamConsumer,
    handler: UserEventHandler,
    topic: String,
}

impl UserEventConsumer {
    pub fn new(settings: &KafkaSettings, sink: Arc<dyn UserEventLog>) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &settings.brokers)
            .set("group.id", &settings.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(EventBusError::BrokerConnectionError)?;

        consumer
            .subscribe(&[settings.topic.as_str()])
            .map_err(EventBusError::SubscriptionError)?;

        Ok(Self {
            consumer,
            handler: UserEventHandler::new(sink),
            topic: settings.topic.clone(),
        })
    }

    /// Consumes until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(topic = %self.topic, "User event consumer started");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                received = self.consumer.recv() => match received {
                    Ok(message) => {
                        if self.handler.handle(message.payload()).await == Disposition::Commit {
                            if let Err(e) = self.consumer.commit_message(&message, CommitMode::Async) {
                                warn!(error = %e, "Failed to commit user event offset");
                            }
                        }
                    }
                    Err(e) => warn!(error = %e, "Kafka receive failed"),
                },
            }
        }

        info!(topic = %self.topic, "User event consumer stopped");
    }
}
