//! User-directory orchestration layer
//!
//! Coordinates three independently failing stores behind one service:
//! - a transactional relational repository, the source of truth
//! - an advisory TTL cache keyed by user id
//! - an append-only event log of user mutations
//!
//! # Example
//!
//! ```rust
//! use directory_core::memory::{MemoryEventLog, MemoryUserCache, MemoryUserStore};
//! use directory_core::{CreateUserRequest, UserService};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), directory_core::UserError> {
//! let store = Arc::new(MemoryUserStore::new());
//! let service = UserService::new(
//!     store.clone(),
//!     store,
//!     Arc::new(MemoryUserCache::new()),
//!     Arc::new(MemoryEventLog::new()),
//! );
//!
//! let id = service
//!     .create(CreateUserRequest {
//!         name: "Bo".to_string(),
//!         email: "bo@example.com".to_string(),
//!         password: "hunter22".to_string(),
//!         role: 2,
//!     })
//!     .await?;
//!
//! assert_eq!(service.get_by_id(id).await?.name, "Bo");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod memory;
pub mod models;
pub mod monitor;
pub mod repository;
pub mod service;
pub mod transaction;
pub mod validation;

pub use error::*;
pub use events::*;
pub use models::*;
pub use monitor::*;
pub use repository::*;
pub use service::{ServiceConfig, UserService, DEFAULT_BATCH_CONCURRENCY, DEFAULT_CACHE_TTL};
pub use transaction::*;
pub use validation::ValidationError;
