// Observability for best-effort side effects
use crate::models::UserId;
use std::fmt;
use tracing::warn;

/// Store whose best-effort write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SideEffectStore {
    Cache,
    EventLog,
}

impl SideEffectStore {
    pub fn as_str(self) -> &'static str {
        match self {
            SideEffectStore::Cache => "cache",
            SideEffectStore::EventLog => "event_log",
        }
    }
}

impl fmt::Display for SideEffectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A swallowed cache or event-log failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideEffectFailure {
    pub store: SideEffectStore,
    /// Store operation, e.g. `"set"`, `"get"`, `"delete"`, `"save"`.
    pub operation: &'static str,
    pub user_id: UserId,
    pub error: String,
}

/// Receives every cache or event-log failure that the service does not surface
/// to its caller, so drift between the stores stays visible to operators.
pub trait SideEffectMonitor: Send + Sync {
    fn record(&self, failure: &SideEffectFailure);
}

/// Logs each failure at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMonitor;

impl SideEffectMonitor for TracingMonitor {
    fn record(&self, failure: &SideEffectFailure) {
        warn!(
            store = %failure.store,
            operation = failure.operation,
            user_id = failure.user_id,
            error = %failure.error,
            "Best-effort side effect failed"
        );
    }
}
