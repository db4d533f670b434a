//! Static file serving.
//!
//! Requests that match no route fall through to a [`StaticFiles`] root.
//! Paths are resolved relative to the root; `..` components, dot-files
//! (unless enabled) and anything whose canonical path escapes the root
//! are refused. Responses carry `ETag` and `Last-Modified` validators and
//! honour `If-None-Match` / `If-Modified-Since` with 304.
//!
//! ```rust
//! use microweb_server::StaticFiles;
//!
//! let files = StaticFiles::new("static")
//!     .index("index.html")
//!     .cache_control("max-age=3600");
//! assert_eq!(files.index_file(), Some("index.html"));
//! ```

use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use bytes::Bytes;
use http::{header, HeaderMap, Method, Response, StatusCode};
use http_body_util::Full;
use thiserror::Error;

use crate::config::StaticFilesSettings;
use crate::server::HttpResponse;

/// Errors from static file resolution.
#[derive(Debug, Error)]
pub enum StaticFileError {
    /// No file at the requested path.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The path is not servable (traversal, hidden file, outside the root).
    #[error("forbidden path: {0}")]
    Forbidden(String),

    /// Only GET and HEAD are served.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StaticFileError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A directory served over GET and HEAD.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index_file: Option<String>,
    cache_control: Option<String>,
    serve_hidden: bool,
}

impl StaticFiles {
    /// Serves files under `root`.
    #[must_use]
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            index_file: None,
            cache_control: None,
            serve_hidden: false,
        }
    }

    /// Builds from transport settings.
    #[must_use]
    pub fn from_settings(settings: &StaticFilesSettings) -> Self {
        let files = Self::new(&settings.root)
            .index(settings.index_file.clone())
            .serve_hidden(settings.serve_hidden);
        if settings.cache_max_age_secs > 0 {
            files.cache_control(format!("max-age={}", settings.cache_max_age_secs))
        } else {
            files
        }
    }

    /// File served for directory requests.
    #[must_use]
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index_file = Some(index.into());
        self
    }

    /// `Cache-Control` value attached to every file response.
    #[must_use]
    pub fn cache_control(mut self, value: impl Into<String>) -> Self {
        self.cache_control = Some(value.into());
        self
    }

    /// Whether dot-files may be served.
    #[must_use]
    pub const fn serve_hidden(mut self, enabled: bool) -> Self {
        self.serve_hidden = enabled;
        self
    }

    /// The served directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The index file name, if set.
    #[must_use]
    pub fn index_file(&self) -> Option<&str> {
        self.index_file.as_deref()
    }

    /// Serves `request_path` (URL path, leading slash optional).
    pub fn handle(
        &self,
        request_path: &str,
        headers: &HeaderMap,
        method: &Method,
    ) -> Result<HttpResponse, StaticFileError> {
        if method != Method::GET && method != Method::HEAD {
            return Err(StaticFileError::MethodNotAllowed);
        }

        let mut file_path = self.resolve(request_path)?;

        if file_path.is_dir() {
            file_path = self
                .index_file
                .as_ref()
                .map(|index| file_path.join(index))
                .filter(|p| p.is_file())
                .ok_or_else(|| StaticFileError::NotFound(request_path.to_string()))?;
        }

        self.serve(&file_path, headers, method)
    }

    fn resolve(&self, request_path: &str) -> Result<PathBuf, StaticFileError> {
        let relative = request_path.trim_start_matches('/');

        for component in Path::new(relative).components() {
            match component {
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(StaticFileError::Forbidden(request_path.to_string()));
                }
                Component::Normal(name)
                    if !self.serve_hidden && name.to_string_lossy().starts_with('.') =>
                {
                    return Err(StaticFileError::Forbidden(request_path.to_string()));
                }
                _ => {}
            }
        }

        let candidate = self
            .root
            .join(relative)
            .canonicalize()
            .map_err(|_| StaticFileError::NotFound(request_path.to_string()))?;
        let root = self
            .root
            .canonicalize()
            .map_err(|_| StaticFileError::NotFound(request_path.to_string()))?;

        if candidate.starts_with(&root) {
            Ok(candidate)
        } else {
            Err(StaticFileError::Forbidden(request_path.to_string()))
        }
    }

    fn serve(
        &self,
        path: &Path,
        headers: &HeaderMap,
        method: &Method,
    ) -> Result<HttpResponse, StaticFileError> {
        let metadata = std::fs::metadata(path)?;
        let modified = metadata.modified().ok();
        let etag = modified.and_then(|m| entity_tag(metadata.len(), m));

        if is_not_modified(headers, etag.as_deref(), modified) {
            return Ok(self.not_modified(etag.as_deref()));
        }

        let body = if method == Method::HEAD {
            Bytes::new()
        } else {
            Bytes::from(std::fs::read(path)?)
        };

        let mut builder = Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, mime_type(path))
            .header(header::CONTENT_LENGTH, metadata.len());

        if let Some(cache_control) = &self.cache_control {
            builder = builder.header(header::CACHE_CONTROL, cache_control.as_str());
        }
        if let Some(etag) = &etag {
            builder = builder.header(header::ETAG, etag.as_str());
        }
        if let Some(modified) = modified {
            builder = builder.header(header::LAST_MODIFIED, httpdate::fmt_http_date(modified));
        }

        builder
            .body(Full::new(body))
            .map_err(|e| StaticFileError::Io(std::io::Error::other(e)))
    }

    fn not_modified(&self, etag: Option<&str>) -> HttpResponse {
        let mut response = Response::new(Full::new(Bytes::new()));
        *response.status_mut() = StatusCode::NOT_MODIFIED;
        let headers = response.headers_mut();
        if let Some(value) = etag.and_then(|e| e.parse().ok()) {
            headers.insert(header::ETAG, value);
        }
        if let Some(value) = self.cache_control.as_deref().and_then(|c| c.parse().ok()) {
            headers.insert(header::CACHE_CONTROL, value);
        }
        response
    }
}

/// Weak validator from size and modification time.
fn entity_tag(len: u64, modified: SystemTime) -> Option<String> {
    let since_epoch = modified.duration_since(SystemTime::UNIX_EPOCH).ok()?;
    Some(format!("W/\"{len:x}-{:x}\"", since_epoch.as_secs()))
}

fn is_not_modified(headers: &HeaderMap, etag: Option<&str>, modified: Option<SystemTime>) -> bool {
    if let Some(if_none_match) = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
    {
        return if_none_match.trim() == "*"
            || etag.is_some_and(|etag| if_none_match.split(',').any(|tag| tag.trim() == etag));
    }

    let since = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| httpdate::parse_http_date(v).ok());

    match (since, modified) {
        (Some(since), Some(modified)) => {
            let secs = |t: SystemTime| {
                t.duration_since(SystemTime::UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default()
            };
            secs(modified) <= secs(since)
        }
        _ => false,
    }
}

fn mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}
