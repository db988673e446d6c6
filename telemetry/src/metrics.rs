//! Metric names and recording helpers.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

pub const SIDE_EFFECT_FAILURES_TOTAL: &str = "directory_side_effect_failures_total";
pub const REQUESTS_TOTAL: &str = "directory_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "directory_request_duration_seconds";

/// Registers descriptions with the installed recorder.
pub fn describe() {
    describe_counter!(
        SIDE_EFFECT_FAILURES_TOTAL,
        "Cache and event-log failures swallowed by the user service"
    );
    describe_counter!(REQUESTS_TOTAL, "User service operations by outcome");
    describe_histogram!(REQUEST_DURATION_SECONDS, "User service operation latency");
}

pub fn record_side_effect_failure(store: &'static str, operation: &'static str) {
    counter!(SIDE_EFFECT_FAILURES_TOTAL, "store" => store, "operation" => operation).increment(1);
}

pub fn record_request(operation: &'static str, status: &'static str, elapsed: Duration) {
    counter!(REQUESTS_TOTAL, "operation" => operation, "status" => status).increment(1);
    histogram!(REQUEST_DURATION_SECONDS, "operation" => operation).record(elapsed.as_secs_f64());
}
