//! Transport configuration.
//!
//! ```rust
//! use microweb_server::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::builder()
//!     .http_addr("127.0.0.1:36000")
//!     .shutdown_timeout(Duration::from_secs(5))
//!     .build();
//!
//! assert_eq!(config.http_addr(), "127.0.0.1:36000");
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Bind address used when none is given.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:36000";

/// Seconds shutdown waits for open connections.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Connections served at once.
pub const DEFAULT_MAX_CONNECTIONS: usize = 10_000;

/// Transport settings. Build with [`ServerConfig::builder()`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    http_addr: String,
    shutdown_timeout: Duration,
    max_connections: usize,
    static_files: Option<StaticFilesSettings>,
}

/// Where and how static files are served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticFilesSettings {
    /// Directory files are served from.
    pub root: PathBuf,
    /// File served for directory requests.
    pub index_file: String,
    /// `Cache-Control: max-age` in seconds; 0 disables the header.
    pub cache_max_age_secs: u64,
    /// Serve dot-files.
    pub serve_hidden: bool,
}

impl StaticFilesSettings {
    /// Settings for `root` with an `index.html` index and no caching header.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_file: "index.html".to_string(),
            cache_max_age_secs: 0,
            serve_hidden: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout: Duration::from_secs(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            static_files: None,
        }
    }
}

impl ServerConfig {
    /// Starts from the defaults.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// The configured `host:port`.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// How long shutdown waits for open connections.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Connections served at once; never zero.
    #[must_use]
    pub const fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Static file settings, if files are served.
    #[must_use]
    pub const fn static_files(&self) -> Option<&StaticFilesSettings> {
        self.static_files.as_ref()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone, Default)]
pub struct ServerConfigBuilder(ServerConfig);

impl ServerConfigBuilder {
    /// Same as [`ServerConfig::builder`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `host:port` to bind; validated when the server binds.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.0.http_addr = addr.into();
        self
    }

    /// How long shutdown waits for open connections.
    #[must_use]
    pub const fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.0.shutdown_timeout = timeout;
        self
    }

    /// Concurrent connection limit. Zero is treated as one.
    #[must_use]
    pub fn max_connections(mut self, max: usize) -> Self {
        self.0.max_connections = max.max(1);
        self
    }

    /// Serves files for unmatched GET requests.
    #[must_use]
    pub fn static_files(mut self, settings: StaticFilesSettings) -> Self {
        self.0.static_files = Some(settings);
        self
    }

    /// Finishes the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        self.0
    }
}
