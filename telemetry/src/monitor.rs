use crate::metrics::record_side_effect_failure;
use directory_core::{SideEffectFailure, SideEffectMonitor, TracingMonitor};

/// Logs each swallowed failure and counts it in
/// `directory_side_effect_failures_total{store, operation}`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsMonitor {
    log: TracingMonitor,
}

impl MetricsMonitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SideEffectMonitor for MetricsMonitor {
    fn record(&self, failure: &SideEffectFailure) {
        self.log.record(failure);
        record_side_effect_failure(failure.store.as_str(), failure.operation);
    }
}
