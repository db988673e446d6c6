//! Kafka transport for user events
//!
//! - [`KafkaUserEventLog`] publishes every user mutation as a JSON message
//!   keyed by event id.
//! - [`UserEventConsumer`] reads the same topic and stores each event in a
//!   [`directory_core::UserEventLog`] sink, typically the relational archive.
//! - [`codec`] defines the payload shared by both sides.
//!
//! # Example
//!
//! ```rust,no_run
//! use events_bus::{KafkaSettings, KafkaUserEventLog};
//! use std::time::Duration;
//!
//! # fn build() -> events_bus::Result<()> {
//! let settings = KafkaSettings {
//!     brokers: "localhost:9092".to_string(),
//!     topic: "user-events".to_string(),
//!     group_id: "directory".to_string(),
//!     send_timeout: Duration::from_secs(5),
//! };
//! let producer = KafkaUserEventLog::new(&settings)?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod consumer;
pub mod error;
pub mod producer;

pub use consumer::*;
pub use error::*;
pub use producer::*;
