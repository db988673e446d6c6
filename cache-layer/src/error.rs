use directory_core::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

impl From<CacheError> for StoreError {
    fn from(err: CacheError) -> Self {
        StoreError::Unavailable(anyhow::Error::new(err))
    }
}
