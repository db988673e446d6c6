//! Redis-backed user cache.
//!
//! Each user is stored as a JSON string under `user:{id}` with `SET EX`, so
//! Redis expires entries on its own. The cache is advisory: callers treat
//! every error here as survivable.

use crate::error::{CacheError, CacheResult};
use crate::model::{user_key, CachedUser};
use async_trait::async_trait;
use directory_core::{StoreError, User, UserCache, UserId};
use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct RedisUserCache {
    redis: ConnectionManager,
}

impl RedisUserCache {
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;
        info!("Connected to Redis user cache");
        Ok(Self { redis })
    }

    pub async fn is_healthy(&self) -> bool {
        let mut conn = self.redis.clone();
        match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Redis health check failed");
                false
            }
        }
    }

    async fn write(&self, user: &User, ttl: Duration) -> CacheResult<()> {
        let payload = serde_json::to_string(&CachedUser::from(user))?;
        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(user_key(user.id), payload, ttl_seconds(ttl))
            .await?;
        Ok(())
    }

    async fn read(&self, id: UserId) -> CacheResult<Option<User>> {
        let mut conn = self.redis.clone();
        let payload: Option<String> = conn.get(user_key(id)).await?;

        payload
            .map(|json| {
                serde_json::from_str::<CachedUser>(&json)
                    .map(User::from)
                    .map_err(CacheError::from)
            })
            .transpose()
    }

    async fn remove(&self, id: UserId) -> CacheResult<()> {
        let mut conn = self.redis.clone();
        conn.del::<_, ()>(user_key(id)).await?;
        Ok(())
    }
}

/// `SET EX` rejects zero; sub-second TTLs round up to one second.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn set(&self, user: &User, ttl: Duration) -> Result<(), StoreError> {
        self.write(user, ttl).await?;
        debug!(user_id = user.id, "Cached user");
        Ok(())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read(id).await?)
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        Ok(self.remove(id).await?)
    }
}
