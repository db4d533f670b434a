//! Subscriber setup for microweb processes.
//!
//! One `fmt` layer, JSON or pretty, behind an [`EnvFilter`]. `RUST_LOG`
//! replaces the configured level when [`LogConfig::respect_env`] is set.
//!
//! # Example
//!
//! ```rust,ignore
//! use microweb_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::default())?;
//! tracing::info!(path = "/stocks", "mapped GET route");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// How the process logs.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Install a subscriber at all.
    pub enabled: bool,

    /// Level or filter directive, e.g. `info` or `microweb_router=debug,warn`.
    pub level: String,

    /// One JSON object per line instead of the pretty format.
    pub json_format: bool,

    /// Emit span open/close events.
    pub span_events: bool,

    /// Source file and line on every event.
    pub file_line_info: bool,

    /// Thread ids on every event.
    pub thread_ids: bool,

    /// Module path on every event.
    pub include_target: bool,

    /// Colour the pretty format.
    pub ansi: bool,

    /// Let `RUST_LOG` replace `level`.
    pub respect_env: bool,

    /// Reported once when logging starts.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            ansi: false,
            respect_env: true,
            service_name: "microweb".to_string(),
        }
    }
}

impl LogConfig {
    /// Pretty, coloured debug output with spans and source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            ansi: true,
            ..Self::default()
        }
    }

    /// JSON at `info`; the same as [`LogConfig::default`].
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// The filter [`init_logging`] would install.
    pub fn env_filter(&self) -> TelemetryResult<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) if self.respect_env => Ok(filter),
            _ => create_env_filter(&self.level),
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = tracing_subscriber::fmt::layer()
            .with_span_events(self.span_events())
            .with_file(self.file_line_info)
            .with_line_number(self.file_line_info)
            .with_thread_ids(self.thread_ids)
            .with_target(self.include_target);

        if self.json_format {
            layer.json().boxed()
        } else {
            layer.pretty().with_ansi(self.ansi).boxed()
        }
    }
}

/// Installs the global subscriber.
///
/// Does nothing when logging is disabled. Fails with
/// [`TelemetryError::LoggingInit`] if a subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = config.env_filter()?;
    tracing_subscriber::registry()
        .with(config.fmt_layer().with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::debug!(
        service.name = %config.service_name,
        level = %config.level,
        json = config.json_format,
        "logging initialized"
    );
    Ok(())
}

/// Parses a filter directive.
///
/// ```
/// use microweb_telemetry::create_env_filter;
///
/// assert!(create_env_filter("microweb_router=debug,warn").is_ok());
/// ```
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::InvalidFilter(format!("{filter}: {e}")))
}

/// Field names shared by microweb log events.
pub mod fields {
    /// Per-request UUID.
    pub const REQUEST_ID: &str = "request_id";
    /// Request method.
    pub const HTTP_METHOD: &str = "http.method";
    /// Request path, without the query.
    pub const HTTP_PATH: &str = "http.path";
    /// Response status code.
    pub const HTTP_STATUS: &str = "http.status_code";
    /// Time spent answering, in milliseconds.
    pub const DURATION_MS: &str = "duration_ms";
    /// Canonical route path.
    pub const ROUTE: &str = "path";
    /// `Controller::name` of the bound handler.
    pub const HANDLER: &str = "handler";
    /// Process name.
    pub const SERVICE_NAME: &str = "service.name";
}

/// Logs one answered request at `info`, using the names in [`fields`].
#[macro_export]
macro_rules! log_request_complete {
    ($request_id:expr, $method:expr, $path:expr, $status:expr, $duration_ms:expr) => {
        tracing::info!(
            request_id = %$request_id,
            http.method = %$method,
            http.path = %$path,
            http.status_code = $status,
            duration_ms = $duration_ms,
            "request served"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let prod = LogConfig::production();
        assert!(prod.json_format);
        assert!(!prod.span_events);
        assert_eq!(prod.level, "info");
        assert_eq!(prod.service_name, "microweb");

        let dev = LogConfig::development();
        assert!(!dev.json_format);
        assert!(dev.ansi && dev.file_line_info && dev.span_events);
        assert_eq!(dev.level, "debug");
    }

    #[test]
    fn test_span_events_follow_flag() {
        assert_eq!(LogConfig::default().span_events(), FmtSpan::NONE);
        assert_eq!(
            LogConfig::development().span_events(),
            FmtSpan::NEW | FmtSpan::CLOSE
        );
    }

    #[test]
    fn test_configured_level_used_when_env_ignored() {
        let config = LogConfig {
            level: "microweb_router=trace,warn".to_string(),
            respect_env: false,
            ..LogConfig::default()
        };
        let filter = config.env_filter().unwrap();
        assert!(filter.to_string().contains("microweb_router=trace"));
    }

    #[test]
    fn test_bad_level_is_rejected() {
        let config = LogConfig {
            level: "microweb=loudest".to_string(),
            respect_env: false,
            ..LogConfig::default()
        };
        assert!(matches!(config.env_filter(), Err(TelemetryError::InvalidFilter(_))));
        assert!(create_env_filter("info").is_ok());
    }

    #[test]
    fn test_disabled_logging_installs_nothing() {
        let config = LogConfig {
            enabled: false,
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_request_macro_expands() {
        crate::log_request_complete!("id", "GET", "/greeting", 200u16, 1u64);
    }
}
