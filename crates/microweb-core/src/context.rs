//! Request and response context types.
//!
//! The [`RequestContext`] is the read-only view of an inbound request that
//! handlers receive. The [`ResponseContext`] lets a handler set response
//! headers before its returned body is written by the transport.

use crate::query::{QueryMap, RequestTarget};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps request ids sortable in logs.
///
/// # Example
///
/// ```
/// use microweb_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request context passed to handlers.
///
/// Carries the request id, method, raw request target, headers and the
/// peer address. Query parameters are exposed through the single
/// [`query_values`](Self::query_values) accessor.
///
/// # Example
///
/// ```
/// use microweb_core::RequestContext;
///
/// let ctx = RequestContext::get("/greeting?name=Ada");
/// assert_eq!(ctx.path(), "/greeting");
/// assert_eq!(ctx.query_values().get("name"), Some("Ada"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    target: String,
    path: String,
    headers: HeaderMap,
    remote_addr: Option<SocketAddr>,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context for the given method and request target.
    ///
    /// The target may be origin-form (`/path?query`) or an absolute URL.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        let target = target.into();
        let path = RequestTarget::parse(&target).path().to_string();
        Self {
            request_id: RequestId::new(),
            method,
            target,
            path,
            headers: HeaderMap::new(),
            remote_addr: None,
            started_at: Instant::now(),
        }
    }

    /// Creates a GET context, mostly useful in tests.
    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    /// Returns a new context with the given headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Returns a new context with the peer address set.
    #[must_use]
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Returns a new context with the given request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw request target, including any query string.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the path component of the target.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw (undecoded) query string, if any.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, q)| q)
    }

    /// Returns the decoded query parameters.
    #[must_use]
    pub fn query_values(&self) -> QueryMap {
        self.query_string().map(QueryMap::parse_query).unwrap_or_default()
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the peer address, if known.
    #[must_use]
    pub const fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Response headers a handler may set while producing its body.
///
/// Handlers receive `&ResponseContext`, so headers are kept behind a lock.
/// Invalid header names or values are ignored and reported as `false`.
///
/// # Example
///
/// ```
/// use microweb_core::ResponseContext;
///
/// let resp = ResponseContext::new();
/// resp.set_content_type("application/json");
/// assert!(resp.set_header("Cache-Control", "no-store"));
/// assert_eq!(resp.header("content-type").as_deref(), Some("application/json"));
/// ```
#[derive(Debug, Default)]
pub struct ResponseContext {
    headers: Mutex<HeaderMap>,
}

impl ResponseContext {
    /// Creates a response context with no headers set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (replaces) a response header.
    pub fn set_header(&self, name: &str, value: &str) -> bool {
        let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
            tracing::debug!(header = %name, "ignoring invalid response header name");
            return false;
        };
        let Ok(value) = HeaderValue::from_str(value) else {
            tracing::debug!(header = %name, "ignoring invalid response header value");
            return false;
        };
        self.headers.lock().insert(name, value);
        true
    }

    /// Sets the `Content-Type` header.
    pub fn set_content_type(&self, value: &str) -> bool {
        self.set_header(CONTENT_TYPE.as_str(), value)
    }

    /// Returns a copy of a header value, if set.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .lock()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    /// Returns true if the header has been set.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.lock().contains_key(name)
    }

    /// Consumes the context, returning the collected headers.
    #[must_use]
    pub fn into_headers(self) -> HeaderMap {
        self.headers.into_inner()
    }
}
