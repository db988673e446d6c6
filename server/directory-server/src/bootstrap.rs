//! Builds the service graph for the configured storage backend.

use crate::state::{AppState, PostgresCheck, RedisCheck};
use anyhow::Context;
use cache_layer::RedisUserCache;
use config_engine::{DirectoryConfig, EventSettings, StorageBackend};
use database_layer::{
    ensure_schema, DatabasePool, PgTransactionManager, PgUserEventArchive, PgUserRepository,
    PoolSettings,
};
use directory_core::memory::{MemoryEventLog, MemoryUserCache, MemoryUserStore};
use directory_core::{ServiceConfig, UserEventLog, UserService};
use events_bus::{KafkaSettings, KafkaUserEventLog, UserEventConsumer};
use logger_redacted::PiiRedactor;
use std::sync::Arc;
use std::time::Duration;
use telemetry::MetricsMonitor;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Background task archiving consumed events into PostgreSQL.
pub struct ArchiveWorker {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ArchiveWorker {
    pub fn spawn(settings: &KafkaSettings, sink: Arc<dyn UserEventLog>) -> anyhow::Result<Self> {
        let consumer =
            UserEventConsumer::new(settings, sink).context("Failed to start user event consumer")?;
        let (shutdown, signal) = watch::channel(false);
        let handle = tokio::spawn(consumer.run(signal));
        Ok(Self { shutdown, handle })
    }

    pub async fn stop(self) {
        // The receiver may already be gone if the consumer exited on its own.
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            warn!(error = %e, "User event consumer task failed");
        }
    }
}

/// Everything `main` needs to serve and later shut down.
pub struct Runtime {
    pub state: AppState,
    archive: Option<ArchiveWorker>,
}

impl Runtime {
    pub async fn shutdown(self) {
        if let Some(archive) = self.archive {
            archive.stop().await;
        }
        info!("Background workers stopped");
    }
}

pub async fn build(config: &DirectoryConfig) -> anyhow::Result<Runtime> {
    let redactor = Arc::new(PiiRedactor::new(&config.logging)?);
    let service_config = ServiceConfig {
        cache_ttl: Duration::from_secs(config.cache.user_ttl_secs),
        batch_concurrency: config.service.batch_concurrency,
    };

    match config.storage.backend {
        StorageBackend::Memory => Ok(build_memory(service_config, redactor)),
        StorageBackend::Postgres => build_postgres(config, service_config, redactor).await,
    }
}

fn build_memory(service_config: ServiceConfig, redactor: Arc<PiiRedactor>) -> Runtime {
    warn!("Using in-memory storage; data is lost on restart");

    let store = Arc::new(MemoryUserStore::new());
    let service = UserService::new(
        store.clone(),
        store,
        Arc::new(MemoryUserCache::new()),
        Arc::new(MemoryEventLog::new()),
    )
    .with_monitor(Arc::new(MetricsMonitor::new()))
    .with_config(service_config);

    Runtime {
        state: AppState::new(Arc::new(service), redactor),
        archive: None,
    }
}

async fn build_postgres(
    config: &DirectoryConfig,
    service_config: ServiceConfig,
    redactor: Arc<PiiRedactor>,
) -> anyhow::Result<Runtime> {
    let pool_settings = PoolSettings {
        max_connections: config.database.max_connections,
        acquire_timeout: Duration::from_secs(config.database.acquire_timeout_secs),
    };
    let pool = DatabasePool::new(&config.database.url, &pool_settings)
        .await
        .context("Failed to connect to PostgreSQL")?;
    if config.database.ensure_schema {
        ensure_schema(&pool).await.context("Failed to prepare schema")?;
    }

    let cache = RedisUserCache::connect(&config.cache.redis_url)
        .await
        .context("Failed to connect to Redis")?;

    let kafka = kafka_settings(&config.events);
    let events = KafkaUserEventLog::new(&kafka).context("Failed to create Kafka producer")?;

    let service = UserService::new(
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(PgTransactionManager::new(pool.clone())),
        Arc::new(cache.clone()),
        Arc::new(events),
    )
    .with_monitor(Arc::new(MetricsMonitor::new()))
    .with_config(service_config);

    let archive = if config.events.archive_enabled {
        let sink = Arc::new(PgUserEventArchive::new(pool.clone()));
        Some(ArchiveWorker::spawn(&kafka, sink)?)
    } else {
        info!("User event archiving disabled");
        None
    };

    let state = AppState::new(Arc::new(service), redactor)
        .with_check(PostgresCheck(pool))
        .with_check(RedisCheck(cache));

    Ok(Runtime { state, archive })
}

pub fn kafka_settings(events: &EventSettings) -> KafkaSettings {
    KafkaSettings {
        brokers: events.brokers.clone(),
        topic: events.topic.clone(),
        group_id: events.group_id.clone(),
        send_timeout: Duration::from_millis(events.send_timeout_ms),
    }
}
