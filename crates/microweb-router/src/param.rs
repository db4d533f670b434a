//! Declared handler parameters.

use microweb_core::TargetType;

/// Where a handler parameter gets its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// The request context, passed through.
    RequestContext,
    /// The response context, passed through.
    ResponseContext,
    /// A query parameter, resolved by key with a default and coerced.
    QueryParam,
    /// No recognised source; always binds to an absent value.
    Unbound,
}

/// A single declared handler parameter.
///
/// Built once when a controller declares its mappings and never mutated.
///
/// # Example
///
/// ```
/// use microweb_core::TargetType;
/// use microweb_router::{ParamSpec, SourceKind};
///
/// let spec = ParamSpec::query("name", TargetType::String).default_value("World");
/// assert_eq!(spec.source(), SourceKind::QueryParam);
/// assert_eq!(spec.query_key(), Some("name"));
/// assert_eq!(spec.declared_default(), Some("World"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    source: SourceKind,
    query_key: Option<String>,
    default_value: Option<String>,
    target: Option<TargetType>,
}

impl ParamSpec {
    /// The request context parameter.
    #[must_use]
    pub const fn request() -> Self {
        Self {
            source: SourceKind::RequestContext,
            query_key: None,
            default_value: None,
            target: None,
        }
    }

    /// The response context parameter.
    #[must_use]
    pub const fn response() -> Self {
        Self {
            source: SourceKind::ResponseContext,
            query_key: None,
            default_value: None,
            target: None,
        }
    }

    /// A query parameter bound by `key` and coerced to `target`.
    ///
    /// Without [`default_value`](Self::default_value) an absent or empty
    /// value resolves to the empty string before coercion.
    pub fn query(key: impl Into<String>, target: TargetType) -> Self {
        Self {
            source: SourceKind::QueryParam,
            query_key: Some(key.into()),
            default_value: None,
            target: Some(target),
        }
    }

    /// A parameter with no binding marker. Binds to `Value::Null`.
    #[must_use]
    pub const fn unbound(target: TargetType) -> Self {
        Self {
            source: SourceKind::Unbound,
            query_key: None,
            default_value: None,
            target: Some(target),
        }
    }

    /// Sets the value used when the query parameter is absent or empty.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Returns the parameter source.
    #[must_use]
    pub const fn source(&self) -> SourceKind {
        self.source
    }

    /// Returns the query key for query parameters.
    #[must_use]
    pub fn query_key(&self) -> Option<&str> {
        self.query_key.as_deref()
    }

    /// Returns the declared default, if any.
    #[must_use]
    pub fn declared_default(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Returns the declared target type; `None` for context parameters.
    #[must_use]
    pub const fn target(&self) -> Option<TargetType> {
        self.target
    }
}
