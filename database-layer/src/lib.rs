//! PostgreSQL storage for the directory service
//!
//! Provides the relational side of the user service:
//! - [`PgUserRepository`] for non-transactional reads and writes on `users`
//! - [`PgTransactionManager`] opening read-committed transactions
//! - [`PgUserEventArchive`] persisting consumed events into `user_events`
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use database_layer::{ensure_schema, DatabasePool, PgTransactionManager, PgUserRepository, PoolSettings};
//!
//! # async fn run() -> Result<(), database_layer::DatabaseError> {
//! let pool = DatabasePool::new("postgresql://localhost/directory", &PoolSettings::default()).await?;
//! ensure_schema(&pool).await?;
//!
//! let repository = PgUserRepository::new(pool.clone());
//! let transactions = PgTransactionManager::new(pool);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod event_archive;
pub mod models;
pub mod schema;
pub mod transaction;
pub mod user_repository;

pub use connection::*;
pub use error::*;
pub use event_archive::*;
pub use schema::ensure_schema;
pub use transaction::*;
pub use user_repository::PgUserRepository;
