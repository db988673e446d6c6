use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Exporter error: {0}")]
    ExporterError(#[from] metrics_exporter_prometheus::BuildError),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
