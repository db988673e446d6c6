//! Metrics for the directory service
//!
//! Installs a Prometheus exporter and provides [`MetricsMonitor`], the
//! production side-effect monitor for the user service.

pub mod error;
pub mod metrics;
pub mod monitor;

pub use error::*;
pub use monitor::MetricsMonitor;

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::info;

/// Starts an HTTP listener that serves `/metrics`.
pub fn install_prometheus_exporter(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    metrics::describe();

    info!(metrics_addr = %addr, "Prometheus metrics exporter started");
    Ok(())
}
