//! Declaration-driven GET routing for microweb.
//!
//! Controllers describe their GET mappings as plain data: a path, an ordered
//! list of [`ParamSpec`]s and a handler closure. The [`RouteRegistry`]
//! validates and binds those mappings once at startup, publishes them to the
//! transport through a [`RouteSink`](microweb_core::RouteSink), and dispatches
//! requests by building handler arguments with the [`binder`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use microweb_core::{RequestContext, ResponseContext, TargetType};
//! use microweb_router::{Controller, Mapping, ParamSpec, RouteRegistry};
//!
//! struct Echo;
//!
//! impl Controller for Echo {
//!     fn mappings(self: Arc<Self>) -> Vec<Mapping> {
//!         vec![Mapping::get("echo")
//!             .param(ParamSpec::query("msg", TargetType::String).default_value("silence"))
//!             .text(|args| Ok(args.text(0)?.to_uppercase()))]
//!     }
//! }
//!
//! let mut registry = RouteRegistry::new();
//! registry.register(Arc::new(Echo)).unwrap();
//!
//! let req = RequestContext::get("/echo?msg=hi");
//! assert_eq!(registry.dispatch("/echo", &req, &ResponseContext::new()), "HI");
//!
//! let req = RequestContext::get("/echo");
//! assert_eq!(registry.dispatch("/echo", &req, &ResponseContext::new()), "SILENCE");
//! ```
//!
//! # Architecture
//!
//! ```text
//!   ControllerCatalog ──discover──▶ ControllerDescriptor ──instantiate──▶ Arc<dyn Controller>
//!                                                                            │ mappings()
//!                                                                            ▼
//!   RouteSink ◀──publish(path, path/)── RouteRegistry ◀──register── Vec<Mapping>
//!       │                                   │
//!       └──── DispatchFn ──dispatch(path)───┘──▶ binder::bind ──▶ handler ──▶ body
//! ```

pub mod binder;
mod discovery;
mod error;
mod mapping;
mod param;
mod registry;

pub use binder::{bind, Arg, Args};
pub use discovery::{ControllerCatalog, ControllerDescriptor};
pub use error::RegistryError;
pub use mapping::{Controller, HandlerFn, Mapping};
pub use param::{ParamSpec, SourceKind};
pub use registry::{
    internal_error_body, is_internal_error, is_not_found, normalize_path, DuplicatePolicy, Route,
    RouteRegistry, INTERNAL_ERROR_PREFIX, NOT_FOUND_BODY,
};
