//! # Error Types
//!
//! Custom error types for Influx Bridge using `thiserror`.
//!
//! Per-datagram decode failures are deliberately *not* represented here:
//! they are recovered locally inside the pipeline (see
//! [`wire::DecodeError`](crate::wire::DecodeError)) and never escalate to
//! this level.

use thiserror::Error;

use crate::sink::SinkError;

/// Main error type for Influx Bridge
#[derive(Debug, Error)]
pub enum InfluxBridgeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors (socket bind, datagram receive, config file read)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unrecoverable storage sink failure
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Result type alias for Influx Bridge
pub type Result<T> = std::result::Result<T, InfluxBridgeError>;
