//! Structured logging for microweb.
//!
//! Library crates log through `tracing` macros only; the binary calls
//! [`init_logging`] once at startup to install a subscriber.
//!
//! ```text
//!   microweb-router ─┐
//!   microweb-server ─┼── tracing macros ──▶ tracing-subscriber (EnvFilter + fmt)
//!   microweb (bin) ──┘                              │
//!                                                   ▼
//!                                         stdout: JSON or pretty
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use microweb_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(path = "/greeting", "mapped GET route");
//! ```

#![doc(html_root_url = "https://docs.rs/microweb-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
