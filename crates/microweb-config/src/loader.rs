//! Configuration loader with layered approach.
//!
//! Layers, later overriding earlier:
//! 1. Built-in defaults or a preset
//! 2. A TOML or JSON file
//! 3. `PREFIX__SECTION__KEY` environment variables
//! 4. The bare `PORT` variable, when enabled

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, LogFormat, MicrowebConfig};

/// Configuration loader.
///
/// # Example
///
/// ```no_run
/// use microweb_config::ConfigLoader;
///
/// # fn main() -> Result<(), microweb_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("microweb.toml")?
///     .with_env_prefix("MICROWEB")
///     .with_port_env()
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: MicrowebConfig,
    env_prefix: Option<String>,
    port_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: MicrowebConfig::default(),
            env_prefix: None,
            port_env: false,
        }
    }

    /// Start with default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = MicrowebConfig::default();
        self
    }

    /// Start with the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = MicrowebConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = MicrowebConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format (TOML or JSON) is taken from the file extension. Sections
    /// absent from the file keep their defaults.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::missing_file(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::unreadable(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format ("toml" or "json").
    ///
    /// ```
    /// use microweb_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [routing]
    ///     controllers = ["GreetingController"]
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.routing.controllers, vec!["GreetingController"]);
    /// assert_eq!(config.server.http_addr, "0.0.0.0:36000");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the form `PREFIX__SECTION__KEY`, for example
    /// `MICROWEB__SERVER__HTTP_ADDR=127.0.0.1:9000`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Let a bare `PORT` variable override the port of `server.http_addr`.
    #[must_use]
    pub fn with_port_env(mut self) -> Self {
        self.port_env = true;
        self
    }

    /// Load a `.env` file into the process environment, if present.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "failed to load .env file"),
        }
        self
    }

    /// Apply environment overrides, validate and return the configuration.
    pub fn load(self) -> Result<MicrowebConfig, ConfigError> {
        let config = self.load_unvalidated_with_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> MicrowebConfig {
        self.config
    }

    fn load_unvalidated_with_env(mut self) -> Result<MicrowebConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars()
                .filter(|(k, _)| k.starts_with(&format!("{prefix}__")))
                .collect();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }

        if self.port_env {
            if let Ok(value) = env::var("PORT") {
                self.apply_port("PORT", &value)?;
            }
        }

        Ok(self.config)
    }

    fn parse_file(content: &str, path: &Path) -> Result<MicrowebConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn apply_port(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let port: u16 = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::bad_env_var(key, "expected port number"))?;
        self.config.server.set_port(port);
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::bad_env_var(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => {
                self.config.server.http_addr = value.to_string();
            }
            ["SERVER", "PORT"] => self.apply_port(key, value)?,
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                self.config.server.shutdown_timeout_secs = value
                    .parse()
                    .map_err(|_| ConfigError::bad_env_var(key, "expected integer"))?;
            }
            ["SERVER", "MAX_CONNECTIONS"] => {
                self.config.server.max_connections = value
                    .parse()
                    .map_err(|_| ConfigError::bad_env_var(key, "expected integer"))?;
            }

            ["STATIC_FILES", "ENABLED"] => {
                self.config.static_files.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::bad_env_var(key, "expected boolean"))?;
            }
            ["STATIC_FILES", "ROOT"] => {
                self.config.static_files.root = value.to_string();
            }
            ["STATIC_FILES", "INDEX_FILE"] => {
                self.config.static_files.index_file = value.to_string();
            }
            ["STATIC_FILES", "CACHE_MAX_AGE_SECS"] => {
                self.config.static_files.cache_max_age_secs = value
                    .parse()
                    .map_err(|_| ConfigError::bad_env_var(key, "expected integer"))?;
            }
            ["STATIC_FILES", "SERVE_HIDDEN"] => {
                self.config.static_files.serve_hidden = parse_bool(value)
                    .ok_or_else(|| ConfigError::bad_env_var(key, "expected boolean"))?;
            }

            ["ROUTING", "BASE_NAMESPACE"] => {
                self.config.routing.base_namespace = value.to_string();
            }
            ["ROUTING", "CONTROLLERS"] => {
                self.config.routing.controllers = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            ["ROUTING", "REJECT_DUPLICATE_ROUTES"] => {
                self.config.routing.reject_duplicate_routes = parse_bool(value)
                    .ok_or_else(|| ConfigError::bad_env_var(key, "expected boolean"))?;
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::bad_env_var(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::bad_env_var(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "ANSI_ENABLED"] => {
                self.config.logging.ansi_enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::bad_env_var(key, "expected boolean"))?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::bad_env_var(key, "expected boolean"))?;
            }
            ["LOGGING", "SERVICE_NAME"] => {
                self.config.logging.service_name = value.to_string();
            }

            _ => {
                tracing::debug!(var = %key, "ignoring unknown configuration variable");
            }
        }

        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
