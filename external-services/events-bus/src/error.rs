use directory_core::StoreError;
use rdkafka::error::KafkaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Event serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid event format: {0}")]
    InvalidEventFormat(String),

    #[error("Event publishing failed: {0}")]
    PublishError(KafkaError),

    #[error("Event broker connection failed: {0}")]
    BrokerConnectionError(KafkaError),

    #[error("Event subscription failed: {0}")]
    SubscriptionError(KafkaError),
}

pub type Result<T> = std::result::Result<T, EventBusError>;

impl From<EventBusError> for StoreError {
    fn from(err: EventBusError) -> Self {
        StoreError::Unavailable(anyhow::Error::new(err))
    }
}
