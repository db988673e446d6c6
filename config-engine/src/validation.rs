// Semantic checks applied after loading
use crate::error::{ConfigError, Result};
use crate::settings::{DirectoryConfig, StorageBackend};

impl DirectoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.service.batch_concurrency == 0 {
            return Err(invalid("service.batch_concurrency must be at least 1"));
        }
        if self.cache.user_ttl_secs == 0 {
            return Err(invalid("cache.user_ttl_secs must be at least 1"));
        }
        if self.storage.backend == StorageBackend::Postgres {
            if self.database.url.trim().is_empty() {
                return Err(invalid("database.url is required for the postgres backend"));
            }
            if self.database.max_connections == 0 {
                return Err(invalid("database.max_connections must be at least 1"));
            }
            if self.events.topic.trim().is_empty() {
                return Err(invalid("events.topic is required for the postgres backend"));
            }
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}
