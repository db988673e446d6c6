use async_trait::async_trait;
use cache_layer::RedisUserCache;
use database_layer::DatabasePool;
use directory_core::UserService;
use logger_redacted::PiiRedactor;
use std::sync::Arc;
use std::time::Instant;

/// A dependency probed by `GET /health`.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn name(&self) -> &'static str;
    async fn is_healthy(&self) -> bool;
}

pub struct PostgresCheck(pub DatabasePool);

#[async_trait]
impl HealthCheck for PostgresCheck {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn is_healthy(&self) -> bool {
        self.0.is_healthy().await
    }
}

pub struct RedisCheck(pub RedisUserCache);

#[async_trait]
impl HealthCheck for RedisCheck {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn is_healthy(&self) -> bool {
        self.0.is_healthy().await
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub redactor: Arc<PiiRedactor>,
    pub checks: Vec<Arc<dyn HealthCheck>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(users: Arc<UserService>, redactor: Arc<PiiRedactor>) -> Self {
        Self {
            users,
            redactor,
            checks: Vec::new(),
            started_at: Instant::now(),
        }
    }

    pub fn with_check(mut self, check: impl HealthCheck + 'static) -> Self {
        self.checks.push(Arc::new(check));
        self
    }
}
