//! Telemetry setup errors.

use thiserror::Error;

/// Why logging could not be set up.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already installed.
    #[error("logging already initialized: {0}")]
    LoggingInit(String),

    /// The level is not a valid `EnvFilter` directive.
    #[error("invalid log filter {0}")]
    InvalidFilter(String),
}
