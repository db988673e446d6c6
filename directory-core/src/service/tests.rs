use super::*;
use crate::memory::MemoryUserStore;
use crate::models::Role;
use crate::repository::{MockUserCache, MockUserEventLog, MockUserRepository};
use crate::events::UserEventType;
use crate::transaction::{MockTransactionManager, UserTransaction};
use async_trait::async_trait;
use mockall::predicate::eq;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct RecordingMonitor {
    failures: Mutex<Vec<SideEffectFailure>>,
}

impl SideEffectMonitor for RecordingMonitor {
    fn record(&self, failure: &SideEffectFailure) {
        self.failures.lock().push(failure.clone());
    }
}

fn build(
    repo: MockUserRepository,
    tx_manager: Arc<dyn TransactionManager>,
    cache: MockUserCache,
    events: MockUserEventLog,
) -> UserService {
    UserService::new(Arc::new(repo), tx_manager, Arc::new(cache), Arc::new(events))
}

fn unused_tx_manager() -> Arc<dyn TransactionManager> {
    let mut manager = MockTransactionManager::new();
    manager.expect_begin_read_committed().never();
    Arc::new(manager)
}

fn stored(id: UserId) -> User {
    User {
        id,
        name: format!("User {id}"),
        email: format!("user{id}@example.com"),
        password: "pw".to_string(),
        role: Role::User,
        created_at: Utc::now(),
        updated_at: None,
    }
}

fn unavailable() -> StoreError {
    StoreError::Unavailable(anyhow::anyhow!("connection refused"))
}

#[tokio::test]
async fn test_create_populates_cache_and_event_log() {
    let mut cache = MockUserCache::new();
    cache
        .expect_set()
        .withf(|user, ttl| user.id == 1 && user.name == "Bo" && *ttl == DEFAULT_CACHE_TTL)
        .times(1)
        .returning(|_, _| Ok(()));

    let mut events = MockUserEventLog::new();
    events
        .expect_save()
        .withf(|event| event.entity_id == 1 && event.event_type() == UserEventType::Create)
        .times(1)
        .returning(|_| Ok(()));

    let service = build(
        MockUserRepository::new(),
        Arc::new(MemoryUserStore::new()),
        cache,
        events,
    );

    let id = service
        .create(CreateUserRequest {
            name: "Bo".to_string(),
            email: "b@x.com".to_string(),
            password: "pw".to_string(),
            role: Role::User.code(),
        })
        .await
        .unwrap();

    assert_eq!(id, 1);
}

#[tokio::test]
async fn test_create_rejects_short_name_before_any_store() {
    let service = build(
        MockUserRepository::new(),
        unused_tx_manager(),
        MockUserCache::new(),
        MockUserEventLog::new(),
    );

    let err = service
        .create(CreateUserRequest {
            name: "B".to_string(),
            email: "b@x.com".to_string(),
            password: "pw".to_string(),
            role: Role::User.code(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, UserError::Validation(_)));
    assert_eq!(err.to_string(), "name must be at least 2 characters");
}

#[tokio::test]
async fn test_create_transaction_failure_skips_side_effects() {
    let mut manager = MockTransactionManager::new();
    manager
        .expect_begin_read_committed()
        .times(1)
        .returning(|| Err(unavailable()));

    let service = build(
        MockUserRepository::new(),
        Arc::new(manager),
        MockUserCache::new(),
        MockUserEventLog::new(),
    );

    let err = service
        .create(CreateUserRequest {
            name: "Bo".to_string(),
            email: "b@x.com".to_string(),
            password: "pw".to_string(),
            role: Role::Admin.code(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, UserError::Transaction(_)));
}

#[tokio::test]
async fn test_get_by_id_cache_hit_skips_repository() {
    let cached = stored(7);
    let expected = cached.clone();

    let mut cache = MockUserCache::new();
    cache
        .expect_get()
        .with(eq(7))
        .times(1)
        .returning(move |_| Ok(Some(cached.clone())));
    cache.expect_set().never();

    let mut repo = MockUserRepository::new();
    repo.expect_get_by_id().never();

    let service = build(repo, unused_tx_manager(), cache, MockUserEventLog::new());

    assert_eq!(service.get_by_id(7).await.unwrap(), expected);
}

#[tokio::test]
async fn test_get_by_id_miss_repopulates_cache() {
    let row = stored(8);
    let from_repo = row.clone();

    let mut cache = MockUserCache::new();
    cache.expect_get().with(eq(8)).times(1).returning(|_| Ok(None));
    cache
        .expect_set()
        .withf(move |user, _| *user == row)
        .times(1)
        .returning(|_, _| Ok(()));

    let mut repo = MockUserRepository::new();
    repo.expect_get_by_id()
        .with(eq(8))
        .times(1)
        .returning(move |_| Ok(Some(from_repo.clone())));

    let service = build(repo, unused_tx_manager(), cache, MockUserEventLog::new());

    assert_eq!(service.get_by_id(8).await.unwrap().id, 8);
}

#[tokio::test]
async fn test_get_by_id_not_found_never_sets_cache() {
    let mut cache = MockUserCache::new();
    cache.expect_get().returning(|_| Ok(None));
    cache.expect_set().never();

    let mut repo = MockUserRepository::new();
    repo.expect_get_by_id().with(eq(99)).times(1).returning(|_| Ok(None));

    let service = build(repo, unused_tx_manager(), cache, MockUserEventLog::new());

    let err = service.get_by_id(99).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_get_by_id_cache_error_falls_through_and_is_reported() {
    let mut cache = MockUserCache::new();
    cache.expect_get().returning(|_| Err(unavailable()));
    cache.expect_set().returning(|_, _| Ok(()));

    let mut repo = MockUserRepository::new();
    repo.expect_get_by_id().returning(|id| Ok(Some(stored(id))));

    let monitor = Arc::new(RecordingMonitor::default());
    let service = build(repo, unused_tx_manager(), cache, MockUserEventLog::new())
        .with_monitor(monitor.clone());

    assert_eq!(service.get_by_id(3).await.unwrap().id, 3);

    let failures = monitor.failures.lock();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].store, SideEffectStore::Cache);
    assert_eq!(failures[0].operation, "get");
}

#[tokio::test]
async fn test_update_invalid_role_never_opens_transaction() {
    let service = build(
        MockUserRepository::new(),
        unused_tx_manager(),
        MockUserCache::new(),
        MockUserEventLog::new(),
    );

    let err = service
        .update(UpdateUserRequest {
            id: 5,
            name: None,
            email: None,
            role: 999,
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "role is not valid");
}

#[tokio::test]
async fn test_update_missing_user_is_not_found_without_side_effects() {
    let service = build(
        MockUserRepository::new(),
        Arc::new(MemoryUserStore::new()),
        MockUserCache::new(),
        MockUserEventLog::new(),
    );

    let err = service
        .update(UpdateUserRequest {
            id: 42,
            name: Some("Alice".to_string()),
            email: None,
            role: Role::Admin.code(),
        })
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_missing_user_is_not_found_without_side_effects() {
    let service = build(
        MockUserRepository::new(),
        Arc::new(MemoryUserStore::new()),
        MockUserCache::new(),
        MockUserEventLog::new(),
    );

    assert!(service.delete(13).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_side_effect_failures_never_fail_writes() {
    let mut cache = MockUserCache::new();
    cache.expect_set().times(1).returning(|_, _| Err(unavailable()));

    let mut events = MockUserEventLog::new();
    events.expect_save().times(1).returning(|_| Err(unavailable()));

    let monitor = Arc::new(RecordingMonitor::default());
    let service = build(
        MockUserRepository::new(),
        Arc::new(MemoryUserStore::new()),
        cache,
        events,
    )
    .with_monitor(monitor.clone());

    let id = service
        .create(CreateUserRequest {
            name: "Carol".to_string(),
            email: "carol@example.com".to_string(),
            password: "pw".to_string(),
            role: Role::User.code(),
        })
        .await
        .unwrap();

    let failures = monitor.failures.lock();
    let stores: Vec<_> = failures.iter().map(|f| (f.store, f.operation, f.user_id)).collect();
    assert_eq!(
        stores,
        vec![(SideEffectStore::Cache, "set", id), (SideEffectStore::EventLog, "save", id)]
    );
}

async fn seeded_store() -> (Arc<MemoryUserStore>, UserId) {
    let store = Arc::new(MemoryUserStore::new());
    let id = store
        .create(&NewUser {
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            password: "pw".to_string(),
            role: Role::User,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    (store, id)
}

fn recorded(monitor: &RecordingMonitor) -> Vec<(SideEffectStore, &'static str, UserId)> {
    monitor
        .failures
        .lock()
        .iter()
        .map(|f| (f.store, f.operation, f.user_id))
        .collect()
}

#[tokio::test]
async fn test_update_side_effect_failures_are_reported() {
    let (store, id) = seeded_store().await;

    let mut cache = MockUserCache::new();
    cache.expect_set().times(1).returning(|_, _| Err(unavailable()));
    let mut events = MockUserEventLog::new();
    events.expect_save().times(1).returning(|_| Err(unavailable()));

    let monitor = Arc::new(RecordingMonitor::default());
    let service = build(MockUserRepository::new(), store.clone(), cache, events)
        .with_monitor(monitor.clone());

    service
        .update(UpdateUserRequest {
            id,
            name: Some("Dana Scott".to_string()),
            email: None,
            role: Role::Admin.code(),
        })
        .await
        .unwrap();

    assert_eq!(store.get_by_id(id).await.unwrap().unwrap().name, "Dana Scott");
    assert_eq!(
        recorded(&monitor),
        vec![(SideEffectStore::Cache, "set", id), (SideEffectStore::EventLog, "save", id)]
    );
}

#[tokio::test]
async fn test_delete_side_effect_failures_are_reported() {
    let (store, id) = seeded_store().await;

    let mut cache = MockUserCache::new();
    cache.expect_delete().with(eq(id)).times(1).returning(|_| Err(unavailable()));
    let mut events = MockUserEventLog::new();
    events.expect_save().times(1).returning(|_| Err(unavailable()));

    let monitor = Arc::new(RecordingMonitor::default());
    let service = build(MockUserRepository::new(), store.clone(), cache, events)
        .with_monitor(monitor.clone());

    service.delete(id).await.unwrap();

    assert!(store.is_empty());
    assert_eq!(
        recorded(&monitor),
        vec![(SideEffectStore::Cache, "delete", id), (SideEffectStore::EventLog, "save", id)]
    );
}

/// Transaction whose update lands on a row another writer renamed after the
/// caller last read it.
struct RenamedElsewhere;

#[async_trait]
impl UserRepository for RenamedElsewhere {
    async fn create(&self, _user: &NewUser) -> std::result::Result<UserId, StoreError> {
        Err(unavailable())
    }

    async fn get_by_id(&self, id: UserId) -> std::result::Result<Option<User>, StoreError> {
        Ok(Some(stored(id)))
    }

    async fn get_by_ids(&self, _ids: &[UserId]) -> std::result::Result<Vec<User>, StoreError> {
        Err(unavailable())
    }

    async fn update(&self, patch: &UserPatch) -> std::result::Result<User, StoreError> {
        let mut user = stored(patch.id);
        user.apply(patch);
        user.name = "Renamed Elsewhere".to_string();
        Ok(user)
    }

    async fn delete(&self, _id: UserId) -> std::result::Result<(), StoreError> {
        Err(unavailable())
    }
}

#[async_trait]
impl UserTransaction for RenamedElsewhere {
    async fn commit(self: Box<Self>) -> std::result::Result<(), StoreError> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> std::result::Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_update_caches_and_emits_the_stored_row() {
    let mut manager = MockTransactionManager::new();
    manager
        .expect_begin_read_committed()
        .times(1)
        .returning(|| Ok(Box::new(RenamedElsewhere) as Box<dyn UserTransaction>));

    let mut cache = MockUserCache::new();
    cache
        .expect_set()
        .withf(|user, _| user.name == "Renamed Elsewhere" && user.email == "new@example.com")
        .times(1)
        .returning(|_, _| Ok(()));

    let mut events = MockUserEventLog::new();
    events
        .expect_save()
        .withf(|event| {
            event.value.user().map(|user| (user.name.as_str(), user.email.as_str()))
                == Some(("Renamed Elsewhere", "new@example.com"))
        })
        .times(1)
        .returning(|_| Ok(()));

    let service = build(MockUserRepository::new(), Arc::new(manager), cache, events);

    service
        .update(UpdateUserRequest {
            id: 6,
            name: None,
            email: Some("new@example.com".to_string()),
            role: Role::User.code(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_batch_partial_miss_uses_single_repository_call() {
    let mut cache = MockUserCache::new();
    cache
        .expect_get()
        .times(3)
        .returning(|id| Ok((id == 1).then(|| stored(id))));
    cache
        .expect_set()
        .withf(|user, _| user.id == 2 || user.id == 3)
        .times(2)
        .returning(|_, _| Ok(()));

    let mut repo = MockUserRepository::new();
    repo.expect_get_by_ids()
        .withf(|ids| ids.to_vec() == vec![2, 3])
        .times(1)
        .returning(|ids| Ok(ids.iter().map(|id| stored(*id)).collect()));

    let service = build(repo, unused_tx_manager(), cache, MockUserEventLog::new());

    let mut ids: Vec<_> = service
        .get_list_by_ids(&[1, 2, 3])
        .await
        .unwrap()
        .into_iter()
        .map(|user| user.id)
        .collect();
    ids.sort_unstable();

    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_batch_all_hits_skip_repository() {
    let mut cache = MockUserCache::new();
    cache.expect_get().times(2).returning(|id| Ok(Some(stored(id))));

    let mut repo = MockUserRepository::new();
    repo.expect_get_by_ids().never();

    let service = build(repo, unused_tx_manager(), cache, MockUserEventLog::new());

    // The repeated id is looked up once.
    let users = service.get_list_by_ids(&[4, 5, 4]).await.unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn test_batch_empty_input_touches_nothing() {
    let mut cache = MockUserCache::new();
    cache.expect_get().never();
    let mut repo = MockUserRepository::new();
    repo.expect_get_by_ids().never();

    let service = build(repo, unused_tx_manager(), cache, MockUserEventLog::new());

    assert!(service.get_list_by_ids(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_repository_failure_fails_whole_call() {
    let mut cache = MockUserCache::new();
    cache.expect_get().returning(|_| Ok(None));
    cache.expect_set().never();

    let mut repo = MockUserRepository::new();
    repo.expect_get_by_ids().times(1).returning(|_| Err(unavailable()));

    let service = build(repo, unused_tx_manager(), cache, MockUserEventLog::new());

    let err = service.get_list_by_ids(&[1, 2]).await.unwrap_err();
    assert!(matches!(err, UserError::Store(_)));
}

#[tokio::test]
async fn test_batch_cache_failures_count_as_misses_and_are_reported() {
    let mut cache = MockUserCache::new();
    cache
        .expect_get()
        .times(2)
        .returning(|id| if id == 1 { Ok(Some(stored(1))) } else { Err(unavailable()) });
    cache
        .expect_set()
        .withf(|user, _| user.id == 2)
        .times(1)
        .returning(|_, _| Err(unavailable()));

    let mut repo = MockUserRepository::new();
    repo.expect_get_by_ids()
        .withf(|ids| ids.to_vec() == vec![2])
        .times(1)
        .returning(|ids| Ok(ids.iter().map(|id| stored(*id)).collect()));

    let monitor = Arc::new(RecordingMonitor::default());
    let service = build(repo, unused_tx_manager(), cache, MockUserEventLog::new())
        .with_monitor(monitor.clone());

    let mut ids: Vec<_> = service
        .get_list_by_ids(&[1, 2])
        .await
        .unwrap()
        .into_iter()
        .map(|user| user.id)
        .collect();
    ids.sort_unstable();

    assert_eq!(ids, vec![1, 2]);
    assert_eq!(
        recorded(&monitor),
        vec![(SideEffectStore::Cache, "get", 2), (SideEffectStore::Cache, "set", 2)]
    );
}

/// Cache that records the peak number of overlapping `get` calls.
#[derive(Default)]
struct ContendedCache {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl UserCache for ContendedCache {
    async fn set(&self, _user: &User, _ttl: Duration) -> std::result::Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, id: UserId) -> std::result::Result<Option<User>, StoreError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Some(stored(id)))
    }

    async fn delete(&self, _id: UserId) -> std::result::Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_batch_fan_out_respects_concurrency_limit() {
    let cache = Arc::new(ContendedCache::default());
    let service = UserService::new(
        Arc::new(MockUserRepository::new()),
        unused_tx_manager(),
        cache.clone(),
        Arc::new(MockUserEventLog::new()),
    )
    .with_config(ServiceConfig {
        batch_concurrency: 3,
        ..ServiceConfig::default()
    });

    let ids: Vec<UserId> = (1..=20).collect();
    let users = service.get_list_by_ids(&ids).await.unwrap();

    assert_eq!(users.len(), 20);
    let peak = cache.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak in-flight lookups was {peak}");
    assert!(peak > 1, "lookups should overlap");
}
