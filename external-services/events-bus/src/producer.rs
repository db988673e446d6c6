use crate::codec::encode;
use crate::error::{EventBusError, Result};
use async_trait::async_trait;
use directory_core::{StoreError, UserEvent, UserEventLog};
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings shared by the producer and the consumer.
#[derive(Debug, Clone)]
pub struct KafkaSettings {
    /// Comma-separated `host:port` list.
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
    pub send_timeout: Duration,
}

/// Publishes user events to Kafka, keyed by event id.
#[derive(Clone)]
pub struct KafkaUserEventLog {
    producer: FutureProducer,
    topic: String,
    send_timeout: Duration,
}

impl KafkaUserEventLog {
    pub fn new(settings: &KafkaSettings) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &settings.brokers)
            .set("message.timeout.ms", settings.send_timeout.as_millis().to_string())
            .create()
            .map_err(EventBusError::BrokerConnectionError)?;

        info!(topic = %settings.topic, "Kafka user event producer ready");

        Ok(Self {
            producer,
            topic: settings.topic.clone(),
            send_timeout: settings.send_timeout,
        })
    }

    async fn publish(&self, event: &UserEvent) -> Result<()> {
        let payload = encode(event)?;
        let key = event.id.to_string();

        let (partition, offset) = self
            .producer
            .send(
                FutureRecord::to(&self.topic).key(key.as_str()).payload(&payload),
                Timeout::After(self.send_timeout),
            )
            .await
            .map_err(|(err, _)| EventBusError::PublishError(err))?;

        debug!(event_id = %event.id, partition, offset, "Published user event");
        Ok(())
    }
}

#[async_trait]
impl UserEventLog for KafkaUserEventLog {
    async fn save(&self, event: &UserEvent) -> std::result::Result<(), StoreError> {
        Ok(self.publish(event).await?)
    }
}
