//! Error types for the exporter.
//!
//! Uses `thiserror` for ergonomic error definitions. Probe failures are
//! deliberately absent: a failed connection is a closed port, not an error.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the instances file or validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read instances file {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid instances file {path}: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Errors raised by the metric sink.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("failed to encode metrics: {0}")]
    Encoding(String),
}

/// Errors that stop the scan loop.
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for metric sink operations.
pub type MetricsResult<T> = Result<T, MetricsError>;

/// Result type alias for collector operations.
pub type CollectorResult<T> = Result<T, CollectorError>;
