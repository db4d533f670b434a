//! The seam between the route registry and the HTTP transport.

use crate::context::{RequestContext, ResponseContext};
use std::sync::Arc;

/// A published dispatch entry point.
///
/// The transport calls it with the request and response contexts and writes
/// the returned string verbatim as the response body.
pub type DispatchFn = Arc<dyn Fn(&RequestContext, &ResponseContext) -> String + Send + Sync>;

/// Receives GET routes published by the registry.
///
/// Implemented by the transport's route table. Publication happens once,
/// before the listener accepts connections.
pub trait RouteSink {
    /// Registers `dispatch` for exact GET requests on `path`.
    fn get(&mut self, path: &str, dispatch: DispatchFn);
}

impl<S: RouteSink + ?Sized> RouteSink for &mut S {
    fn get(&mut self, path: &str, dispatch: DispatchFn) {
        (**self).get(path, dispatch);
    }
}
