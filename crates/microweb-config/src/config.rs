//! Main configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, RoutingConfig, ServerConfig, StaticFilesConfig};

/// Complete microweb configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use microweb_config::MicrowebConfig;
///
/// let config = MicrowebConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:36000");
/// assert_eq!(config.routing.base_namespace, "microweb::webapp");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct MicrowebConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Static file serving.
    #[serde(default)]
    pub static_files: StaticFilesConfig,

    /// Controller discovery and route registration.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MicrowebConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .server
            .http_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::invalid(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.max_connections == 0 {
            return Err(ConfigError::invalid(
                "server.max_connections",
                "must be greater than zero",
            ));
        }

        if self.static_files.enabled && self.static_files.root.trim().is_empty() {
            return Err(ConfigError::invalid(
                "static_files.root",
                "must not be empty when static files are enabled",
            ));
        }

        if self.static_files.index_file.contains(['/', '\\']) {
            return Err(ConfigError::invalid(
                "static_files.index_file",
                "must be a file name, not a path",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid("logging.level", "must not be empty"));
        }

        Ok(())
    }

    /// Development preset: pretty debug logs with source locations.
    ///
    /// ```
    /// use microweb_config::MicrowebConfig;
    ///
    /// let config = MicrowebConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;
        config.static_files.cache_max_age_secs = 0;
        config
    }

    /// Production preset: JSON logs, duplicate routes rejected.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;
        config.routing.reject_duplicate_routes = true;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MicrowebConfig::default().validate().is_ok());
        assert!(MicrowebConfig::development().validate().is_ok());
        assert!(MicrowebConfig::production().validate().is_ok());
    }

    #[test]
    fn test_invalid_http_addr() {
        let mut config = MicrowebConfig::default();
        config.server.http_addr = "localhost".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.http_addr"));
    }

    #[test]
    fn test_zero_connections_rejected() {
        let mut config = MicrowebConfig::default();
        config.server.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_static_root_only_matters_when_enabled() {
        let mut config = MicrowebConfig::default();
        config.static_files.root = String::new();
        assert!(config.validate().is_err());

        config.static_files.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_index_file_must_be_a_name() {
        let mut config = MicrowebConfig::default();
        config.static_files.index_file = "../index.html".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_presets() {
        let dev = MicrowebConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert_eq!(dev.static_files.cache_max_age_secs, 0);

        let prod = MicrowebConfig::production();
        assert_eq!(prod.logging.format, LogFormat::Json);
        assert!(prod.routing.reject_duplicate_routes);
    }
}
