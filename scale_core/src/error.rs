use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("scale disconnected")]
    Disconnected,
    #[error("io error: {0}")]
    Io(String),
    #[error("hardware fault: {0}")]
    Hardware(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("timeout waiting for a scale reading")]
    Timeout,
    #[error("telemetry stopped")]
    Cancelled,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing device id")]
    MissingDeviceId,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
