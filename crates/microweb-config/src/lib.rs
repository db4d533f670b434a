//! Typed configuration for microweb servers.
//!
//! Configuration is layered, later layers overriding earlier ones:
//! defaults, then a TOML or JSON file, then `MICROWEB__SECTION__KEY`
//! environment variables, then the bare `PORT` variable. Unknown fields
//! are rejected.
//!
//! # Example
//!
//! ```no_run
//! use microweb_config::ConfigLoader;
//!
//! # fn main() -> Result<(), microweb_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("microweb.toml")?
//!     .with_env_prefix("MICROWEB")
//!     .with_port_env()
//!     .load()?;
//!
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:36000"
//! shutdown_timeout_secs = 30
//!
//! [static_files]
//! root = "static"
//! index_file = "index.html"
//!
//! [routing]
//! base_namespace = "microweb::webapp"
//! controllers = []
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `MICROWEB__SERVER__HTTP_ADDR=127.0.0.1:9000`
//! - `MICROWEB__ROUTING__CONTROLLERS=GreetingController,StocksApiController`
//! - `MICROWEB__LOGGING__FORMAT=pretty`
//! - `PORT=8080` replaces only the port of `server.http_addr`

mod config;
mod error;
mod loader;
mod schema;

pub use config::MicrowebConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    LogFormat, LoggingConfig, RoutingConfig, ServerConfig, StaticFilesConfig, DEFAULT_PORT,
};
