//! In-process store implementations.
//!
//! Used by the test suites and by the server's `memory` storage backend for
//! local development. Nothing here is durable.

use crate::error::StoreError;
use crate::events::UserEvent;
use crate::models::{NewUser, User, UserId, UserPatch};
use crate::repository::{UserCache, UserEventLog, UserRepository};
use crate::transaction::{TransactionManager, UserTransaction};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as WriterLock, OwnedMutexGuard};
use tokio::time::Instant;

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    last_id: UserId,
}

impl Tables {
    fn insert(&mut self, user: &NewUser) -> UserId {
        self.last_id += 1;
        let id = self.last_id;
        self.users.insert(id, user.clone().with_id(id));
        id
    }

    fn get(&self, id: UserId) -> Option<User> {
        self.users.get(&id).cloned()
    }

    fn get_many(&self, ids: &[UserId]) -> Vec<User> {
        ids.iter().filter_map(|id| self.get(*id)).collect()
    }

    fn update(&mut self, patch: &UserPatch) -> Result<User, StoreError> {
        let user = self.users.get_mut(&patch.id).ok_or(StoreError::NotFound)?;
        user.apply(patch);
        Ok(user.clone())
    }

    fn remove(&mut self, id: UserId) -> Result<(), StoreError> {
        self.users.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

/// Relational-store stand-in with read-committed transactions.
///
/// Transactions are serialised by a single writer lock and stage their
/// changes on a private copy; readers outside the transaction only ever see
/// committed state.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    committed: Arc<Mutex<Tables>>,
    writer: Arc<WriterLock<()>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.committed.lock().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn create(&self, user: &NewUser) -> Result<UserId, StoreError> {
        let _writer = self.writer.lock().await;
        Ok(self.committed.lock().insert(user))
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.committed.lock().get(id))
    }

    async fn get_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        Ok(self.committed.lock().get_many(ids))
    }

    async fn update(&self, patch: &UserPatch) -> Result<User, StoreError> {
        let _writer = self.writer.lock().await;
        self.committed.lock().update(patch)
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        let _writer = self.writer.lock().await;
        self.committed.lock().remove(id)
    }
}

#[async_trait]
impl TransactionManager for MemoryUserStore {
    async fn begin_read_committed(&self) -> Result<Box<dyn UserTransaction>, StoreError> {
        let writer = Arc::clone(&self.writer).lock_owned().await;
        let staged = self.committed.lock().clone();
        Ok(Box::new(MemoryUserTransaction {
            committed: Arc::clone(&self.committed),
            staged: Mutex::new(staged),
            _writer: writer,
        }))
    }
}

/// An open transaction on a [`MemoryUserStore`].
pub struct MemoryUserTransaction {
    committed: Arc<Mutex<Tables>>,
    staged: Mutex<Tables>,
    _writer: OwnedMutexGuard<()>,
}

#[async_trait]
impl UserRepository for MemoryUserTransaction {
    async fn create(&self, user: &NewUser) -> Result<UserId, StoreError> {
        Ok(self.staged.lock().insert(user))
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.staged.lock().get(id))
    }

    async fn get_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        Ok(self.staged.lock().get_many(ids))
    }

    async fn update(&self, patch: &UserPatch) -> Result<User, StoreError> {
        self.staged.lock().update(patch)
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        self.staged.lock().remove(id)
    }
}

#[async_trait]
impl UserTransaction for MemoryUserTransaction {
    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let staged = self.staged.into_inner();
        *self.committed.lock() = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}

/// TTL-bounded cache backed by a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserCache {
    entries: Arc<DashMap<UserId, (User, Option<Instant>)>>,
}

impl MemoryUserCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry without touching expiry, for assertions.
    pub fn peek(&self, id: UserId) -> Option<User> {
        self.entries.get(&id).map(|entry| entry.value().0.clone())
    }
}

#[async_trait]
impl UserCache for MemoryUserCache {
    async fn set(&self, user: &User, ttl: Duration) -> Result<(), StoreError> {
        let expires_at = Instant::now().checked_add(ttl);
        self.entries.insert(user.id, (user.clone(), expires_at));
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let now = Instant::now();
        let lookup = self.entries.get(&id).map(|entry| {
            let (user, expires_at) = entry.value();
            expires_at.map_or(true, |at| at > now).then(|| user.clone())
        });

        match lookup {
            Some(Some(user)) => Ok(Some(user)),
            Some(None) => {
                self.entries.remove(&id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        self.entries.remove(&id);
        Ok(())
    }
}

/// Append-only event log kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventLog {
    events: Arc<Mutex<Vec<UserEvent>>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<UserEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl UserEventLog for MemoryEventLog {
    async fn save(&self, event: &UserEvent) -> Result<(), StoreError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}
