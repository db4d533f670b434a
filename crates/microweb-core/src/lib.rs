//! # Microweb Core
//!
//! Core types shared by every microweb crate.
//!
//! This crate provides the foundational types of the routing layer:
//!
//! - [`RequestContext`] - Per-request view of method, target and headers
//! - [`ResponseContext`] - Response headers a handler may set before the body is written
//! - [`QueryMap`] - Decoded query parameters (first occurrence wins)
//! - [`RequestTarget`] - Splits a URL or request target into path and query
//! - [`TargetType`], [`ReturnType`] and [`Value`] - The primitive types handlers exchange
//! - [`HandlerError`] - Failure raised by a handler, carrying a kind and a message
//! - [`RouteSink`] - The transport seam that receives published GET routes

#![doc(html_root_url = "https://docs.rs/microweb-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod query;
mod transport;
mod value;

pub use context::{RequestContext, RequestId, ResponseContext};
pub use error::{short_type_name, HandlerError, HandlerResult};
pub use query::{QueryMap, RequestTarget};
pub use transport::{DispatchFn, RouteSink};
pub use value::{ReturnType, TargetType, Value};
