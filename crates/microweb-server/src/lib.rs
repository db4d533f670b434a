//! HTTP transport for microweb.
//!
//! The route registry publishes its dispatch closures into a [`GetRoutes`]
//! table through [`RouteSink`](microweb_core::RouteSink); the [`Server`]
//! answers GET and HEAD requests from that table, falls back to
//! [`StaticFiles`], and derives the status code from the returned body.
//!
//! ```rust
//! use std::sync::Arc;
//! use microweb_core::{RequestContext, ResponseContext, RouteSink};
//! use microweb_server::Server;
//!
//! let mut server = Server::builder().build();
//! server
//!     .routes_mut()
//!     .get("/ping", Arc::new(|_: &RequestContext, _: &ResponseContext| "pong".to_string()));
//!
//! let response = server.handle(&RequestContext::get("/ping"));
//! assert_eq!(response.status(), http::StatusCode::OK);
//! ```

mod config;
mod routes;
mod server;
pub mod shutdown;
pub mod static_files;

pub use config::{
    ServerConfig, ServerConfigBuilder, StaticFilesSettings, DEFAULT_HTTP_ADDR,
    DEFAULT_MAX_CONNECTIONS, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use routes::GetRoutes;
pub use server::{
    infer_content_type, status_for_body, BoundServer, HttpResponse, ResponseBody, Server,
    ServerBuilder, ServerError,
};
pub use shutdown::{ConnectionLimiter, ShutdownSignal};
pub use static_files::{StaticFileError, StaticFiles};
