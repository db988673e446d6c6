use logger_redacted::LoggerConfig;
use serde::{Deserialize, Serialize};

/// Complete service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub events: EventSettings,
    pub service: ServiceSettings,
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub logging: LoggerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Create missing tables at startup.
    pub ensure_schema: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost:5432/directory".to_string(),
            max_connections: 20,
            acquire_timeout_secs: 30,
            ensure_schema: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub redis_url: String,
    pub user_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            user_ttl_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    pub brokers: String,
    pub topic: String,
    pub group_id: String,
    pub send_timeout_ms: u64,
    /// Run the consumer that archives events into the relational store.
    pub archive_enabled: bool,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            topic: "user-events".to_string(),
            group_id: "directory-archive".to_string(),
            send_timeout_ms: 5000,
            archive_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    pub batch_concurrency: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self { batch_concurrency: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Prometheus scrape endpoint; disabled when `None`.
    pub metrics_port: Option<u16>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            metrics_port: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local stores, for development only.
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
}
