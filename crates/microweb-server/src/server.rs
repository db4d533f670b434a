//! HTTP server.
//!
//! One tokio task per accepted connection, hyper HTTP/1.1 on each. A
//! request is answered from the GET table first, then from static files,
//! then with the not-found body. The status code is derived from the
//! dispatched body: the not-found body maps to 404, an internal-error body
//! to 500, anything else to 200.
//!
//! # Example
//!
//! ```rust,ignore
//! use microweb_server::{Server, ShutdownSignal};
//!
//! let server = Server::builder().http_addr("127.0.0.1:36000").build();
//! server.run_with_shutdown(ShutdownSignal::with_os_signals()).await?;
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, Method, Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use microweb_core::{RequestContext, ResponseContext};
use microweb_router::{is_internal_error, is_not_found, NOT_FOUND_BODY};

use crate::config::{ServerConfig, ServerConfigBuilder, StaticFilesSettings};
use crate::routes::GetRoutes;
use crate::shutdown::{ConnectionLimiter, ShutdownSignal};
use crate::static_files::{StaticFileError, StaticFiles};

/// HTTP response body type.
pub type ResponseBody = Full<Bytes>;

/// HTTP response type.
pub type HttpResponse = Response<ResponseBody>;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// Transport errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address does not parse.
    #[error("invalid bind address '{addr}': {reason}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parse failure.
        reason: String,
    },

    /// The listener could not bind.
    #[error("failed to bind to {addr}")]
    Bind {
        /// The address that was tried.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error on the listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Status for a dispatched body.
///
/// ```rust
/// use http::StatusCode;
/// use microweb_server::status_for_body;
///
/// assert_eq!(status_for_body("404 Not Found"), StatusCode::NOT_FOUND);
/// assert_eq!(status_for_body("500 Internal Server Error\nX: y"), StatusCode::INTERNAL_SERVER_ERROR);
/// assert_eq!(status_for_body("hello"), StatusCode::OK);
/// ```
#[must_use]
pub fn status_for_body(body: &str) -> StatusCode {
    if is_not_found(body) {
        StatusCode::NOT_FOUND
    } else if is_internal_error(body) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

/// Default `Content-Type` for a dispatched body.
#[must_use]
pub fn infer_content_type(body: &str) -> &'static str {
    if body.starts_with(['{', '[']) {
        JSON
    } else {
        TEXT
    }
}

/// The microweb HTTP server.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    routes: GetRoutes,
    static_files: Option<StaticFiles>,
}

impl Server {
    /// Creates a server with an empty route table.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let static_files = config.static_files().map(StaticFiles::from_settings);
        Self {
            config,
            routes: GetRoutes::new(),
            static_files,
        }
    }

    /// Creates a server builder.
    #[must_use]
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the GET table.
    #[must_use]
    pub const fn routes(&self) -> &GetRoutes {
        &self.routes
    }

    /// Returns the GET table for publication.
    pub fn routes_mut(&mut self) -> &mut GetRoutes {
        &mut self.routes
    }

    /// Returns the static file root, if serving is enabled.
    #[must_use]
    pub const fn static_files(&self) -> Option<&StaticFiles> {
        self.static_files.as_ref()
    }

    /// Answers one request in-process.
    pub fn handle(&self, request: &RequestContext) -> HttpResponse {
        let response = self.respond(request);
        let duration_ms = u64::try_from(request.elapsed().as_millis()).unwrap_or(u64::MAX);
        microweb_telemetry::log_request_complete!(
            request.request_id(),
            request.method(),
            request.path(),
            response.status().as_u16(),
            duration_ms
        );
        response
    }

    fn respond(&self, request: &RequestContext) -> HttpResponse {
        let method = request.method();
        if method != Method::GET && method != Method::HEAD {
            return method_not_allowed();
        }
        let head = method == Method::HEAD;

        if let Some(dispatch) = self.routes.lookup(request.path()) {
            let response = ResponseContext::new();
            let body = dispatch(request, &response);
            return body_response(body, response.into_headers(), head);
        }

        if let Some(files) = &self.static_files {
            match files.handle(request.path(), request.headers(), method) {
                Ok(response) => return response,
                Err(StaticFileError::NotFound(_)) => {}
                Err(e) => {
                    if matches!(e, StaticFileError::Io(_)) {
                        tracing::error!(path = %request.path(), error = %e, "failed to serve static file");
                    } else {
                        tracing::debug!(path = %request.path(), error = %e, "refused static file");
                    }
                    return status_response(e.status_code());
                }
            }
        }

        tracing::debug!(path = %request.path(), "no route or file");
        body_response(NOT_FOUND_BODY.to_string(), HeaderMap::new(), head)
    }

    /// Binds the listener without accepting yet.
    pub async fn bind(self) -> Result<BoundServer, ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|e| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                reason: e.to_string(),
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        Ok(BoundServer {
            server: Arc::new(self),
            listener,
            local_addr,
        })
    }

    /// Serves until SIGINT or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Serves until `shutdown` is triggered.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        self.bind().await?.serve(shutdown).await
    }

    async fn serve_connection(
        self: Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let server = Arc::clone(&self);
        let service = service_fn(move |req: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_hyper(&req, remote_addr)) }
        });

        let mut conn = pin!(http1::Builder::new().serve_connection(TokioIo::new(stream), service));

        tokio::select! {
            result = conn.as_mut() => return result,
            () = shutdown.recv() => {}
        }

        tracing::debug!(remote_addr = %remote_addr, "closing connection for shutdown");
        conn.as_mut().graceful_shutdown();
        conn.await
    }

    fn handle_hyper(&self, req: &Request<Incoming>, remote_addr: SocketAddr) -> HttpResponse {
        let target = req.uri().path_and_query().map_or("/", |pq| pq.as_str());
        let request = RequestContext::new(req.method().clone(), target)
            .with_headers(req.headers().clone())
            .with_remote_addr(remote_addr);
        self.handle(&request)
    }
}

/// A server whose listener is bound.
#[derive(Debug)]
pub struct BoundServer {
    server: Arc<Server>,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl BoundServer {
    /// The bound address, with the real port when port 0 was configured.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections until `shutdown`, then drains.
    pub async fn serve(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let config = self.server.config();
        let limiter = ConnectionLimiter::new(config.max_connections());
        let shutdown_timeout = config.shutdown_timeout();

        tracing::info!(
            addr = %self.local_addr,
            routes = self.server.routes().len(),
            "server listening"
        );

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let Some(permit) = limiter.try_admit() else {
                            tracing::warn!(
                                remote_addr = %remote_addr,
                                limit = config.max_connections(),
                                "connection limit reached, dropping connection"
                            );
                            continue;
                        };
                        let server = Arc::clone(&self.server);
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(e) = server.serve_connection(stream, remote_addr, shutdown).await {
                                tracing::debug!(remote_addr = %remote_addr, error = %e, "connection error");
                            }
                            drop(permit);
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to accept connection");
                    }
                },
                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        drain(&limiter, shutdown_timeout).await;
        tracing::info!("server stopped");
        Ok(())
    }
}

async fn drain(limiter: &ConnectionLimiter, timeout: Duration) {
    let open = limiter.active_connections();
    if open == 0 {
        return;
    }
    tracing::info!(open, timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX), "draining connections");
    if !limiter.drain(timeout).await {
        tracing::warn!(
            open = limiter.active_connections(),
            "shutdown timeout reached with connections still open"
        );
    }
}

fn body_response(body: String, handler_headers: HeaderMap, head: bool) -> HttpResponse {
    let status = status_for_body(&body);
    let content_type = infer_content_type(&body);
    let length = body.len();

    let mut response = Response::new(Full::new(if head {
        Bytes::new()
    } else {
        Bytes::from(body)
    }));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    headers.extend(handler_headers);
    response
}

fn status_response(status: StatusCode) -> HttpResponse {
    let text = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or_default()
    );
    let mut response = Response::new(Full::new(Bytes::from(text)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT));
    response
}

fn method_not_allowed() -> HttpResponse {
    let mut response = status_response(StatusCode::METHOD_NOT_ALLOWED);
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
    response
}

/// Builder for [`Server`].
#[derive(Debug, Default)]
pub struct ServerBuilder {
    config: ServerConfigBuilder,
    routes: Option<GetRoutes>,
}

impl ServerBuilder {
    /// Creates a builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.config = self.config.http_addr(addr);
        self
    }

    /// Sets the graceful shutdown timeout.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.shutdown_timeout(timeout);
        self
    }

    /// Sets the connection limit.
    #[must_use]
    pub fn max_connections(mut self, max: usize) -> Self {
        self.config = self.config.max_connections(max);
        self
    }

    /// Enables static file serving.
    #[must_use]
    pub fn static_files(mut self, settings: StaticFilesSettings) -> Self {
        self.config = self.config.static_files(settings);
        self
    }

    /// Starts from an already published route table.
    #[must_use]
    pub fn routes(mut self, routes: GetRoutes) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Builds the server.
    #[must_use]
    pub fn build(self) -> Server {
        let mut server = Server::new(self.config.build());
        if let Some(routes) = self.routes {
            server.routes = routes;
        }
        server
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use microweb_core::{DispatchFn, RouteSink};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn dispatch<F>(f: F) -> DispatchFn
    where
        F: Fn(&RequestContext, &ResponseContext) -> String + Send + Sync + 'static,
    {
        Arc::new(f)
    }

    fn server() -> Server {
        let mut server = Server::builder().http_addr("127.0.0.1:0").build();
        let routes = server.routes_mut();
        routes.get(
            "/greeting",
            dispatch(|req, _| {
                let query = req.query_values();
                format!("Hola {}", query.get("name").unwrap_or("World"))
            }),
        );
        routes.get("/json", dispatch(|_, _| r#"{"ok":true}"#.to_string()));
        routes.get(
            "/typed",
            dispatch(|_, resp| {
                resp.set_content_type("application/vnd.test");
                resp.set_header("Cache-Control", "no-store");
                "plain".to_string()
            }),
        );
        routes.get(
            "/boom",
            dispatch(|_, _| "500 Internal Server Error\nHandlerError: boom".to_string()),
        );
        server
    }

    async fn body_of(response: HttpResponse) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_status_for_body() {
        assert_eq!(status_for_body(NOT_FOUND_BODY), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for_body("500 Internal Server Error\nX: y"),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_for_body("404 Not Found here"), StatusCode::OK);
        assert_eq!(status_for_body(""), StatusCode::OK);
    }

    #[test]
    fn test_infer_content_type() {
        assert_eq!(infer_content_type("{\"a\":1}"), JSON);
        assert_eq!(infer_content_type("[1]"), JSON);
        assert_eq!(infer_content_type("Hola"), TEXT);
        assert_eq!(infer_content_type(""), TEXT);
    }

    #[tokio::test]
    async fn test_routed_text() {
        let server = server();
        let response = server.handle(&RequestContext::get("/greeting?name=Ada"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], TEXT);
        assert_eq!(body_of(response).await, "Hola Ada");
    }

    #[tokio::test]
    async fn test_routed_json_and_handler_headers() {
        let server = server();

        let json = server.handle(&RequestContext::get("/json"));
        assert_eq!(json.headers()[CONTENT_TYPE], JSON);

        let typed = server.handle(&RequestContext::get("/typed"));
        assert_eq!(typed.headers()[CONTENT_TYPE], "application/vnd.test");
        assert_eq!(typed.headers()["cache-control"], "no-store");
        assert_eq!(body_of(typed).await, "plain");
    }

    #[tokio::test]
    async fn test_error_body_is_500() {
        let server = server();
        let response = server.handle(&RequestContext::get("/boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_of(response).await.ends_with("HandlerError: boom"));
    }

    #[tokio::test]
    async fn test_unmatched_is_404() {
        let server = server();
        let response = server.handle(&RequestContext::get("/missing"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_of(response).await, NOT_FOUND_BODY);
    }

    #[test]
    fn test_other_methods_are_405() {
        let server = server();
        let response = server.handle(&RequestContext::new(Method::POST, "/greeting"));
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, HEAD");
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        let server = server();
        let response = server.handle(&RequestContext::new(Method::HEAD, "/greeting"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LENGTH], "10");
        assert!(body_of(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_static_fallback_after_routes() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>home</html>").unwrap();
        std::fs::write(dir.path().join("json"), "file").unwrap();

        let mut server = Server::builder()
            .static_files(StaticFilesSettings::new(dir.path()))
            .build();
        server
            .routes_mut()
            .get("/json", dispatch(|_, _| "[]".to_string()));

        let index = server.handle(&RequestContext::get("/"));
        assert_eq!(index.status(), StatusCode::OK);
        assert_eq!(body_of(index).await, "<html>home</html>");

        let routed = server.handle(&RequestContext::get("/json"));
        assert_eq!(body_of(routed).await, "[]");

        let hidden = server.handle(&RequestContext::get("/../secret"));
        assert_eq!(hidden.status(), StatusCode::FORBIDDEN);

        let missing = server.handle(&RequestContext::get("/nope.css"));
        assert_eq!(body_of(missing).await, NOT_FOUND_BODY);
    }

    #[tokio::test]
    async fn test_invalid_address() {
        let server = Server::builder().http_addr("not-an-address").build();
        let err = server.run_with_shutdown(ShutdownSignal::new()).await.unwrap_err();
        assert!(matches!(err, ServerError::InvalidAddress { .. }));
    }

    #[tokio::test]
    async fn test_run_and_shutdown() {
        let server = Server::builder()
            .http_addr("127.0.0.1:0")
            .shutdown_timeout(Duration::from_millis(100))
            .build();

        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let result =
            tokio::time::timeout(Duration::from_secs(5), server.run_with_shutdown(shutdown)).await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_serves_over_tcp() {
        let bound = server().bind().await.unwrap();
        let addr = bound.local_addr();
        assert_ne!(addr.port(), 0);

        let shutdown = ShutdownSignal::new();
        let handle = tokio::spawn(bound.serve(shutdown.clone()));

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /greeting?name=Lin HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        assert!(raw.starts_with("HTTP/1.1 200 OK"));
        assert!(raw.to_ascii_lowercase().contains("content-type: text/plain; charset=utf-8"));
        assert!(raw.ends_with("Hola Lin"));

        shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }
}
