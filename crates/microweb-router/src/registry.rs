//! The route registry.
//!
//! Routes are registered single-threaded at startup, then the registry is
//! frozen in an `Arc` and published to the transport. From that point on it
//! is only read, so dispatch needs no locking.
//!
//! Each canonical path `P` not ending in `/` is published twice, as `P` and
//! `P/`; both entries dispatch to `P`.

use crate::binder::bind;
use crate::error::RegistryError;
use crate::mapping::{Controller, HandlerFn};
use crate::param::ParamSpec;
use microweb_core::{
    HandlerError, QueryMap, RequestContext, ResponseContext, ReturnType, RouteSink, Value,
};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Body returned when no route is bound to a path.
pub const NOT_FOUND_BODY: &str = "404 Not Found";

/// First line of the body returned when a handler fails.
pub const INTERNAL_ERROR_PREFIX: &str = "500 Internal Server Error";

/// Formats the body returned for a failed handler.
///
/// ```
/// use microweb_core::HandlerError;
/// use microweb_router::internal_error_body;
///
/// let body = internal_error_body(&HandlerError::new("IllegalState", "boom"));
/// assert_eq!(body, "500 Internal Server Error\nIllegalState: boom");
/// ```
#[must_use]
pub fn internal_error_body(err: &HandlerError) -> String {
    format!("{INTERNAL_ERROR_PREFIX}\n{}: {}", err.kind(), err.message())
}

/// Returns true if `body` is the not-found body.
#[must_use]
pub fn is_not_found(body: &str) -> bool {
    body == NOT_FOUND_BODY
}

/// Returns true if `body` was produced by [`internal_error_body`].
#[must_use]
pub fn is_internal_error(body: &str) -> bool {
    body.strip_prefix(INTERNAL_ERROR_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('\n'))
}

/// Normalises a declared path: empty becomes `/`, a leading `/` is added.
///
/// ```
/// use microweb_router::normalize_path;
///
/// assert_eq!(normalize_path(""), "/");
/// assert_eq!(normalize_path("stocks"), "/stocks");
/// assert_eq!(normalize_path("/api/hello/"), "/api/hello/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// What to do when a second mapping binds an already bound path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Last registration wins; the replacement is logged.
    #[default]
    Overwrite,
    /// Registration fails with [`RegistryError::DuplicateRoute`].
    Reject,
}

/// A bound GET route.
#[derive(Clone)]
pub struct Route {
    path: String,
    controller: &'static str,
    method: String,
    params: Vec<ParamSpec>,
    handler: HandlerFn,
}

impl Route {
    /// The canonical (normalised) path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The controller type path.
    #[must_use]
    pub const fn controller(&self) -> &'static str {
        self.controller
    }

    /// The mapping name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The declared parameters.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// `Controller#method`, as shown in logs.
    #[must_use]
    pub fn target(&self) -> String {
        format!("{}#{}", self.controller, self.method)
    }

    /// Binds arguments and runs the handler, containing panics.
    pub fn invoke(
        &self,
        request: &RequestContext,
        response: &ResponseContext,
        query: &QueryMap,
    ) -> Result<Value, HandlerError> {
        let args = bind(&self.params, request, response, query);
        panic::catch_unwind(AssertUnwindSafe(|| (self.handler)(&args)))
            .unwrap_or_else(|payload| Err(HandlerError::from_panic(payload.as_ref())))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("controller", &self.controller)
            .field("method", &self.method)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Maps normalised paths to bound routes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use microweb_core::{RequestContext, ResponseContext};
/// use microweb_router::{Controller, Mapping, RouteRegistry, NOT_FOUND_BODY};
///
/// struct Index;
///
/// impl Controller for Index {
///     fn mappings(self: Arc<Self>) -> Vec<Mapping> {
///         vec![Mapping::get("").text(|_| Ok("index".to_string()))]
///     }
/// }
///
/// let mut registry = RouteRegistry::new();
/// registry.register(Arc::new(Index)).unwrap();
///
/// let req = RequestContext::get("/");
/// let resp = ResponseContext::new();
/// assert_eq!(registry.dispatch("/", &req, &resp), "index");
/// assert_eq!(registry.dispatch("/nope", &req, &resp), NOT_FOUND_BODY);
/// ```
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: HashMap<String, Route>,
    policy: DuplicatePolicy,
}

impl RouteRegistry {
    /// Creates an empty registry that overwrites duplicate paths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given duplicate policy.
    #[must_use]
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            routes: HashMap::new(),
            policy,
        }
    }

    /// Returns the duplicate policy.
    #[must_use]
    pub const fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Registers every GET mapping declared by `controller`.
    ///
    /// All mappings are validated before any is bound, so a failing
    /// controller leaves the registry unchanged. Returns the number of
    /// routes bound.
    pub fn register(&mut self, controller: Arc<dyn Controller>) -> Result<usize, RegistryError> {
        let controller_name = controller.name();
        let mut pending: Vec<Route> = Vec::new();

        for mapping in controller.mappings() {
            let path = normalize_path(mapping.path());
            let returns = mapping.returns();
            let (_, method, params, handler) = mapping.into_parts();

            if returns != ReturnType::Text {
                return Err(RegistryError::NonTextReturn {
                    controller: controller_name.to_string(),
                    method,
                    path,
                    returns,
                });
            }
            let Some(handler) = handler else {
                return Err(RegistryError::MissingHandler {
                    controller: controller_name.to_string(),
                    method,
                    path,
                });
            };

            let route = Route {
                path,
                controller: controller_name,
                method,
                params,
                handler,
            };

            if self.policy == DuplicatePolicy::Reject {
                let existing = self
                    .routes
                    .get(&route.path)
                    .or_else(|| pending.iter().find(|r| r.path == route.path));
                if let Some(existing) = existing {
                    return Err(RegistryError::DuplicateRoute {
                        path: route.path.clone(),
                        existing: existing.target(),
                        duplicate: route.target(),
                    });
                }
            }

            pending.push(route);
        }

        let count = pending.len();
        for route in pending {
            tracing::info!(
                path = %route.path,
                handler = %route.target(),
                "mapped GET route"
            );
            if let Some(previous) = self.routes.insert(route.path.clone(), route) {
                tracing::warn!(
                    path = %previous.path,
                    replaced = %previous.target(),
                    "GET route bound twice, last registration wins"
                );
            }
        }
        Ok(count)
    }

    /// Number of canonical routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no route is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Canonical paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Returns the route bound to a canonical path.
    #[must_use]
    pub fn route(&self, path: &str) -> Option<&Route> {
        self.routes.get(path)
    }

    /// Publishes every route and its trailing-slash alias to the transport.
    ///
    /// Aliases are published first so that an explicitly registered
    /// `P/` route keeps its own binding. Returns the number of entries
    /// handed to the sink.
    pub fn publish(self: &Arc<Self>, sink: &mut dyn RouteSink) -> usize {
        let paths: Vec<String> = self.paths().into_iter().map(str::to_string).collect();
        let mut published = 0;

        for path in paths.iter().filter(|p| !p.ends_with('/')) {
            sink.get(&format!("{path}/"), self.dispatcher(path));
            published += 1;
        }
        for path in &paths {
            sink.get(path, self.dispatcher(path));
            published += 1;
        }

        tracing::debug!(routes = self.len(), entries = published, "published GET routes");
        published
    }

    fn dispatcher(self: &Arc<Self>, canonical: &str) -> microweb_core::DispatchFn {
        let registry = Arc::clone(self);
        let canonical = canonical.to_string();
        Arc::new(move |req: &RequestContext, resp: &ResponseContext| {
            registry.dispatch(&canonical, req, resp)
        })
    }

    /// Dispatches a request to the route bound at the canonical `path`.
    ///
    /// Never fails: an unknown path yields [`NOT_FOUND_BODY`] and a failing
    /// or panicking handler yields an [`internal_error_body`].
    pub fn dispatch(&self, path: &str, request: &RequestContext, response: &ResponseContext) -> String {
        let Some(route) = self.routes.get(path) else {
            tracing::debug!(path = %path, "no GET route bound");
            return NOT_FOUND_BODY.to_string();
        };

        let query = request.query_values();
        match route.invoke(request, response, &query) {
            Ok(value) => value.into_body(),
            Err(err) => {
                tracing::error!(
                    request_id = %request.request_id(),
                    path = %route.path,
                    handler = %route.target(),
                    kind = %err.kind(),
                    error = %err.message(),
                    "handler failed"
                );
                internal_error_body(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Mapping;
    use microweb_core::{DispatchFn, TargetType};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct GreetingController {
        counter: AtomicU64,
    }

    impl Controller for GreetingController {
        fn mappings(self: Arc<Self>) -> Vec<Mapping> {
            vec![Mapping::get("/greeting")
                .named("greeting")
                .param(ParamSpec::query("name", TargetType::String).default_value("World"))
                .text(move |args| {
                    let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok(format!("Hola {} (#{n})", args.text(0)?))
                })]
        }
    }

    struct FailingController;

    impl Controller for FailingController {
        fn mappings(self: Arc<Self>) -> Vec<Mapping> {
            vec![
                Mapping::get("/fail")
                    .text(|_| Err(HandlerError::new("IllegalStateException", "boom"))),
                Mapping::get("/panic").text(|_| panic!("handler exploded")),
                Mapping::get("/parse")
                    .param(ParamSpec::query("n", TargetType::String))
                    .text(|args| Ok(args.text(0)?.parse::<u8>()?.to_string())),
                Mapping::get("/nothing").returning(ReturnType::Text, |_| Ok(Value::Null)),
            ]
        }
    }

    struct Declared(Vec<Mapping>);

    impl Controller for Declared {
        fn mappings(self: Arc<Self>) -> Vec<Mapping> {
            self.0.clone()
        }
    }

    fn text_mapping(path: &str, body: &'static str) -> Mapping {
        Mapping::get(path).text(move |_| Ok(body.to_string()))
    }

    #[derive(Default)]
    struct RecordingSink {
        routes: Vec<(String, DispatchFn)>,
    }

    impl RouteSink for RecordingSink {
        fn get(&mut self, path: &str, dispatch: DispatchFn) {
            self.routes.retain(|(p, _)| p != path);
            self.routes.push((path.to_string(), dispatch));
        }
    }

    impl RecordingSink {
        fn call(&self, path: &str) -> Option<String> {
            let req = RequestContext::get(path);
            let resp = ResponseContext::new();
            self.routes
                .iter()
                .find(|(p, _)| p == req.path())
                .map(|(_, dispatch)| dispatch(&req, &resp))
        }
    }

    fn call(registry: &RouteRegistry, target: &str) -> String {
        let req = RequestContext::get(target);
        let resp = ResponseContext::new();
        registry.dispatch(req.path(), &req, &resp)
    }

    #[test]
    fn test_greeting_counter_persists_across_requests() {
        let mut registry = RouteRegistry::new();
        registry
            .register(Arc::new(GreetingController::default()))
            .unwrap();

        assert_eq!(call(&registry, "/greeting?name=Ada"), "Hola Ada (#1)");
        assert_eq!(call(&registry, "/greeting?name=Ada"), "Hola Ada (#2)");
        assert_eq!(call(&registry, "/greeting"), "Hola World (#3)");
    }

    #[test]
    fn test_register_returns_route_count() {
        let mut registry = RouteRegistry::new();
        let count = registry.register(Arc::new(FailingController)).unwrap();
        assert_eq!(count, 4);
        assert_eq!(registry.paths(), vec!["/fail", "/nothing", "/panic", "/parse"]);
    }

    #[test]
    fn test_paths_are_normalized() {
        let mut registry = RouteRegistry::new();
        registry
            .register(Arc::new(Declared(vec![
                text_mapping("", "root"),
                text_mapping("api/hello", "hello"),
            ])))
            .unwrap();

        assert_eq!(registry.paths(), vec!["/", "/api/hello"]);
        assert_eq!(call(&registry, "/"), "root");
        assert_eq!(call(&registry, "/api/hello"), "hello");
    }

    #[test]
    fn test_non_text_return_is_rejected() {
        let mut registry = RouteRegistry::new();
        let err = registry
            .register(Arc::new(Declared(vec![
                text_mapping("/ok", "ok"),
                Mapping::get("/count")
                    .named("count")
                    .returning(ReturnType::Int, |_| Ok(Value::Int(1))),
            ])))
            .unwrap_err();

        assert!(matches!(
            err,
            RegistryError::NonTextReturn { ref path, returns: ReturnType::Int, .. } if path == "/count"
        ));
        assert!(registry.is_empty(), "a rejected controller binds nothing");
    }

    #[test]
    fn test_missing_handler_is_rejected() {
        let mut registry = RouteRegistry::new();
        let err = registry
            .register(Arc::new(Declared(vec![Mapping::get("/empty")])))
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingHandler { .. }));
    }

    #[test]
    fn test_duplicate_overwrites_by_default() {
        let mut registry = RouteRegistry::new();
        registry
            .register(Arc::new(Declared(vec![text_mapping("/dup", "first")])))
            .unwrap();
        registry
            .register(Arc::new(Declared(vec![text_mapping("dup", "second")])))
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(call(&registry, "/dup"), "second");
    }

    #[test]
    fn test_duplicate_rejected_with_policy() {
        let mut registry = RouteRegistry::with_policy(DuplicatePolicy::Reject);
        registry
            .register(Arc::new(Declared(vec![text_mapping("/dup", "first")])))
            .unwrap();
        let err = registry
            .register(Arc::new(Declared(vec![text_mapping("/dup", "second")])))
            .unwrap_err();

        assert!(matches!(err, RegistryError::DuplicateRoute { ref path, .. } if path == "/dup"));
        assert_eq!(call(&registry, "/dup"), "first");

        let err = RouteRegistry::with_policy(DuplicatePolicy::Reject)
            .register(Arc::new(Declared(vec![
                text_mapping("/same", "a"),
                text_mapping("same", "b"),
            ])))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_dispatch_unknown_path_is_not_found() {
        let registry = RouteRegistry::new();
        let body = call(&registry, "/missing");
        assert_eq!(body, NOT_FOUND_BODY);
        assert!(is_not_found(&body));
    }

    #[test]
    fn test_handler_error_becomes_internal_error_body() {
        let mut registry = RouteRegistry::new();
        registry.register(Arc::new(FailingController)).unwrap();

        let body = call(&registry, "/fail");
        assert_eq!(body, "500 Internal Server Error\nIllegalStateException: boom");
        assert!(is_internal_error(&body));

        let body = call(&registry, "/parse?n=999");
        assert_eq!(
            body,
            "500 Internal Server Error\nParseIntError: number too large to fit in target type"
        );
    }

    #[test]
    fn test_panic_is_contained() {
        let mut registry = RouteRegistry::new();
        registry.register(Arc::new(FailingController)).unwrap();

        assert_eq!(
            call(&registry, "/panic"),
            "500 Internal Server Error\nPanic: handler exploded"
        );
        assert_eq!(call(&registry, "/parse?n=7"), "7", "later requests still route");
    }

    #[test]
    fn test_null_result_is_empty_body() {
        let mut registry = RouteRegistry::new();
        registry.register(Arc::new(FailingController)).unwrap();
        assert_eq!(call(&registry, "/nothing"), "");
    }

    #[test]
    fn test_publish_registers_trailing_slash_alias() {
        let mut registry = RouteRegistry::new();
        registry
            .register(Arc::new(Declared(vec![
                text_mapping("/stocks", "stocks"),
                text_mapping("/", "root"),
            ])))
            .unwrap();
        let registry = Arc::new(registry);

        let mut sink = RecordingSink::default();
        let published = registry.publish(&mut sink);

        assert_eq!(published, 3);
        assert_eq!(sink.call("/stocks").as_deref(), Some("stocks"));
        assert_eq!(sink.call("/stocks/").as_deref(), Some("stocks"));
        assert_eq!(sink.call("/").as_deref(), Some("root"));
        assert_eq!(sink.call("/stocks//"), None);
    }

    #[test]
    fn test_explicit_trailing_slash_route_keeps_its_binding() {
        let mut registry = RouteRegistry::new();
        registry
            .register(Arc::new(Declared(vec![
                text_mapping("/a", "plain"),
                text_mapping("/a/", "slashed"),
            ])))
            .unwrap();
        let registry = Arc::new(registry);

        let mut sink = RecordingSink::default();
        registry.publish(&mut sink);

        assert_eq!(sink.call("/a").as_deref(), Some("plain"));
        assert_eq!(sink.call("/a/").as_deref(), Some("slashed"));
    }

    #[test]
    fn test_handler_sets_response_headers() {
        let mut registry = RouteRegistry::new();
        registry
            .register(Arc::new(Declared(vec![Mapping::get("/json")
                .param(ParamSpec::response())
                .text(|args| {
                    args.response(0)?.set_content_type("application/json");
                    Ok("{}".to_string())
                })])))
            .unwrap();

        let req = RequestContext::get("/json");
        let resp = ResponseContext::new();
        assert_eq!(registry.dispatch("/json", &req, &resp), "{}");
        assert_eq!(resp.header("content-type").as_deref(), Some("application/json"));
    }

    #[test]
    fn test_concurrent_dispatch() {
        let mut registry = RouteRegistry::new();
        registry
            .register(Arc::new(GreetingController::default()))
            .unwrap();
        let registry = Arc::new(registry);
        let bodies = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let bodies = Arc::clone(&bodies);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let body = call(&registry, "/greeting?name=T");
                        bodies.lock().push(body);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut bodies = bodies.lock().clone();
        bodies.sort();
        bodies.dedup();
        assert_eq!(bodies.len(), 200, "every request sees a distinct counter value");
    }
}
