use crate::error::StoreError;
use crate::events::UserEvent;
use crate::models::{NewUser, User, UserId, UserPatch};
use async_trait::async_trait;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Durable source of truth for user records.
///
/// When obtained through a [`crate::transaction::UserTransaction`], every call
/// runs inside that transaction.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &NewUser) -> Result<UserId, StoreError>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Ids without a stored record are silently omitted; result order is unspecified.
    async fn get_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;

    /// Writes the supplied fields and returns the record as stored afterwards.
    /// Returns [`StoreError::NotFound`] when no row matched.
    async fn update(&self, patch: &UserPatch) -> Result<User, StoreError>;

    /// Returns [`StoreError::NotFound`] when no row matched.
    async fn delete(&self, id: UserId) -> Result<(), StoreError>;
}

/// Advisory, TTL-bounded user cache keyed by user id. Never authoritative.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserCache: Send + Sync {
    async fn set(&self, user: &User, ttl: Duration) -> Result<(), StoreError>;

    /// A miss is `Ok(None)`, not an error.
    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn delete(&self, id: UserId) -> Result<(), StoreError>;
}

/// Append-only sink for user mutation events.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserEventLog: Send + Sync {
    async fn save(&self, event: &UserEvent) -> Result<(), StoreError>;
}
