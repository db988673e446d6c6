//! Configuration for the directory service
//!
//! Values are layered with `figment`, later sources winning:
//! 1. built-in defaults
//! 2. an optional YAML file
//! 3. `DIRECTORY_`-prefixed environment variables (`__` separates levels)
//!
//! ```yaml
//! database:
//!   url: postgresql://localhost:5432/directory
//!   max_connections: 20
//! cache:
//!   redis_url: redis://127.0.0.1:6379
//!   user_ttl_secs: 300
//! events:
//!   brokers: localhost:9092
//!   topic: user-events
//!   group_id: directory-archive
//! service:
//!   batch_concurrency: 10
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! storage:
//!   backend: postgres   # or memory
//! logging:
//!   level: info
//!   json: false
//! ```

pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use error::*;
pub use loader::{layered, load, ENV_PREFIX};
pub use settings::*;
