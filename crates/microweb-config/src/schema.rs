//! The four configuration sections.
//!
//! Every section deserializes with `#[serde(default)]`, so a file only
//! needs the keys it changes. Unknown keys are rejected.

use serde::{Deserialize, Serialize};

/// Port used when nothing overrides it.
pub const DEFAULT_PORT: u16 = 36000;

/// `[server]`: listener settings.
///
/// ```
/// use microweb_config::ServerConfig;
///
/// let mut server = ServerConfig::default();
/// server.set_port(8080);
/// assert_eq!(server.http_addr, "0.0.0.0:8080");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// `host:port` to bind.
    pub http_addr: String,
    /// Seconds to wait for open connections on shutdown.
    pub shutdown_timeout_secs: u64,
    /// Connections accepted at once; extra connections are dropped.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            shutdown_timeout_secs: 30,
            max_connections: 10_000,
        }
    }
}

impl ServerConfig {
    /// Replaces the port of `http_addr`, keeping the host.
    pub fn set_port(&mut self, port: u16) {
        let host = self
            .http_addr
            .rsplit_once(':')
            .map_or(self.http_addr.as_str(), |(host, _)| host);
        self.http_addr = format!("{host}:{port}");
    }
}

/// `[static_files]`: the directory served when no route matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticFilesConfig {
    /// Fall back to files at all.
    pub enabled: bool,
    /// Directory, relative to the working directory unless absolute.
    pub root: String,
    /// Served for requests naming a directory.
    pub index_file: String,
    /// `Cache-Control: max-age`; 0 sends no header.
    pub cache_max_age_secs: u64,
    /// Serve names starting with a dot.
    pub serve_hidden: bool,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: "static".to_string(),
            index_file: "index.html".to_string(),
            cache_max_age_secs: 3600,
            serve_hidden: false,
        }
    }
}

/// `[routing]`: which controllers are registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingConfig {
    /// Namespace scanned when `controllers` is empty.
    pub base_namespace: String,
    /// Controllers to register instead of scanning, by type path or simple name.
    pub controllers: Vec<String>,
    /// Fail startup when two mappings claim one path.
    pub reject_duplicate_routes: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_namespace: "microweb::webapp".to_string(),
            controllers: Vec::new(),
            reject_duplicate_routes: false,
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line, human readable.
    Pretty,
}

/// `[logging]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Install a subscriber.
    pub enabled: bool,
    /// Level or `EnvFilter` directive.
    pub level: String,
    /// JSON or pretty.
    pub format: LogFormat,
    /// Colour pretty output.
    pub ansi_enabled: bool,
    /// Source file and line on each event.
    pub include_location: bool,
    /// Name logged at startup.
    pub service_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            ansi_enabled: false,
            include_location: false,
            service_name: "microweb".to_string(),
        }
    }
}
