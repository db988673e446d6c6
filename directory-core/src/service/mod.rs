//! User-record orchestration.
//!
//! [`UserService`] decides, per operation, which store is consulted and in
//! which order:
//!
//! - writes go through a read-committed transaction on the relational store;
//! - after a successful commit the cache is refreshed and an event is emitted,
//!   both best-effort;
//! - reads are cache-aside: cache first, repository on miss, then repopulate.
//!
//! Cache and event-log failures never fail a call. They are handed to the
//! configured [`SideEffectMonitor`].
//!
//! Across concurrent calls for the same id no ordering is enforced, so a
//! reader may observe a stale cache entry until the next write refreshes it.

mod batch;

#[cfg(test)]
mod tests;

use crate::error::{Result, StoreError, UserError};
use crate::events::UserEvent;
use crate::models::{CreateUserRequest, NewUser, UpdateUserRequest, User, UserId, UserPatch};
use crate::monitor::{SideEffectFailure, SideEffectMonitor, SideEffectStore, TracingMonitor};
use crate::repository::{UserCache, UserEventLog, UserRepository};
use crate::transaction::{read_committed, TransactionManager};
use crate::validation::{validate_create, validate_update};
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_BATCH_CONCURRENCY: usize = 10;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Expiry applied to every cache write.
    pub cache_ttl: Duration,
    /// Maximum number of cache calls in flight during a batch lookup.
    pub batch_concurrency: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    tx_manager: Arc<dyn TransactionManager>,
    cache: Arc<dyn UserCache>,
    events: Arc<dyn UserEventLog>,
    monitor: Arc<dyn SideEffectMonitor>,
    config: ServiceConfig,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        tx_manager: Arc<dyn TransactionManager>,
        cache: Arc<dyn UserCache>,
        events: Arc<dyn UserEventLog>,
    ) -> Self {
        Self {
            repo,
            tx_manager,
            cache,
            events,
            monitor: Arc::new(TracingMonitor),
            config: ServiceConfig::default(),
        }
    }

    pub fn with_monitor(mut self, monitor: Arc<dyn SideEffectMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn with_config(mut self, mut config: ServiceConfig) -> Self {
        config.batch_concurrency = config.batch_concurrency.max(1);
        self.config = config;
        self
    }

    /// Validates and stores a new user, returning the assigned id.
    #[instrument(skip_all)]
    pub async fn create(&self, request: CreateUserRequest) -> Result<UserId> {
        let role = validate_create(&request)?;

        let new_user = NewUser {
            name: request.name,
            email: request.email,
            password: request.password,
            role,
            created_at: timestamp(),
        };

        let record = new_user.clone();
        let id = read_committed(self.tx_manager.as_ref(), move |tx| {
            Box::pin(async move { tx.create(&record).await.map_err(UserError::Transaction) })
        })
        .await?;

        let user = new_user.with_id(id);
        self.refresh_cache(&user).await;
        self.emit(UserEvent::created(id, user)).await;

        debug!(user_id = id, "User created");
        Ok(id)
    }

    /// Cache-aside read.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: UserId) -> Result<User> {
        match self.cache.get(id).await {
            Ok(Some(user)) => {
                debug!(user_id = id, "Cache hit");
                return Ok(user);
            }
            Ok(None) => debug!(user_id = id, "Cache miss"),
            Err(err) => self.report(SideEffectStore::Cache, "get", id, &err),
        }

        let user = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|err| not_found_or(id, err, UserError::Store))?
            .ok_or(UserError::NotFound(id))?;

        self.refresh_cache(&user).await;
        Ok(user)
    }

    /// Applies a partial update. Empty name or email leave the stored value unchanged.
    #[instrument(skip_all, fields(user_id = request.id))]
    pub async fn update(&self, request: UpdateUserRequest) -> Result<()> {
        let role = validate_update(&request)?;

        let patch = UserPatch {
            id: request.id,
            name: request.supplied_name().map(str::to_owned),
            email: request.supplied_email().map(str::to_owned),
            role,
            updated_at: timestamp(),
        };

        let user = read_committed(self.tx_manager.as_ref(), move |tx| {
            Box::pin(async move {
                tx.update(&patch)
                    .await
                    .map_err(|err| not_found_or(patch.id, err, UserError::Transaction))
            })
        })
        .await?;

        let id = user.id;
        self.refresh_cache(&user).await;
        self.emit(UserEvent::updated(id, user)).await;

        debug!(user_id = id, "User updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<()> {
        read_committed(self.tx_manager.as_ref(), move |tx| {
            Box::pin(async move {
                tx.delete(id)
                    .await
                    .map_err(|err| not_found_or(id, err, UserError::Transaction))
            })
        })
        .await?;

        if let Err(err) = self.cache.delete(id).await {
            self.report(SideEffectStore::Cache, "delete", id, &err);
        }
        self.emit(UserEvent::deleted(id, id)).await;

        debug!(user_id = id, "User deleted");
        Ok(())
    }

    async fn refresh_cache(&self, user: &User) {
        if let Err(err) = self.cache.set(user, self.config.cache_ttl).await {
            self.report(SideEffectStore::Cache, "set", user.id, &err);
        }
    }

    async fn emit(&self, event: UserEvent) {
        if let Err(err) = self.events.save(&event).await {
            self.report(SideEffectStore::EventLog, "save", event.entity_id, &err);
        }
    }

    fn report(&self, store: SideEffectStore, operation: &'static str, user_id: UserId, err: &StoreError) {
        self.monitor.record(&SideEffectFailure {
            store,
            operation,
            user_id,
            error: err.to_string(),
        });
    }
}

/// Relational timestamps keep microseconds; truncate so every store agrees.
fn timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn not_found_or(id: UserId, err: StoreError, wrap: fn(StoreError) -> UserError) -> UserError {
    match err {
        StoreError::NotFound => UserError::NotFound(id),
        other => wrap(other),
    }
}
