//! # microweb
//!
//! Declaration-driven GET routing on a small HTTP runtime.
//!
//! Controllers declare their GET mappings and parameter bindings; the
//! [`Bootstrap`] discovers them, registers each path with its
//! trailing-slash alias and serves them next to a static file root.
//!
//! ## Crates
//!
//! | Crate | Concern |
//! |-------|---------|
//! | [`core`] | Request/response contexts, query parsing, values |
//! | [`router`] | Mappings, discovery, registry, parameter binding |
//! | [`server`] | hyper transport, static files, shutdown |
//! | [`config`] | TOML/JSON/env configuration |
//! | [`telemetry`] | Structured logging |
//!
//! ## Example
//!
//! ```rust
//! use microweb::Bootstrap;
//! use microweb::config::MicrowebConfig;
//! use microweb::core::RequestContext;
//!
//! let mut config = MicrowebConfig::default();
//! config.static_files.enabled = false;
//!
//! let (server, _registry) = Bootstrap::new(config).build_server().unwrap();
//! let response = server.handle(&RequestContext::get("/greeting/?name=Ada"));
//! assert_eq!(response.status(), 200);
//! ```

pub mod bootstrap;
pub mod webapp;

pub use bootstrap::{log_config, server_config, Bootstrap, BootstrapError};

pub use microweb_config as config;
pub use microweb_core as core;
pub use microweb_router as router;
pub use microweb_server as server;
pub use microweb_telemetry as telemetry;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
