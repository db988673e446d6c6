//! Redis user cache for the directory service.

pub mod error;
pub mod model;
pub mod redis_cache;

pub use error::*;
pub use model::{user_key, CachedUser};
pub use redis_cache::RedisUserCache;
