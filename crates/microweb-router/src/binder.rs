//! Parameter binding.
//!
//! [`bind`] turns a route's declared [`ParamSpec`]s into the argument list of
//! one invocation. Context parameters are passed through by reference, query
//! parameters are resolved against the request's [`QueryMap`] with default
//! fallback and coerced to their declared type. Binding never fails; a
//! handler that reads an argument with the wrong accessor gets a
//! [`HandlerError`] instead.

use crate::param::{ParamSpec, SourceKind};
use microweb_core::{
    HandlerError, HandlerResult, QueryMap, RequestContext, ResponseContext, TargetType, Value,
};

/// One bound argument.
#[derive(Debug, Clone)]
pub enum Arg<'r> {
    /// The request context.
    Request(&'r RequestContext),
    /// The response context.
    Response(&'r ResponseContext),
    /// A coerced query value, or `Value::Null` for unbound parameters.
    Value(Value),
}

impl Arg<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Request(_) => "RequestContext",
            Self::Response(_) => "ResponseContext",
            Self::Value(v) => v.kind(),
        }
    }
}

/// The ordered arguments of a single handler invocation.
///
/// Accessors are positional and typed; they mirror the declared parameter
/// list of the mapping.
///
/// # Example
///
/// ```
/// use microweb_core::{QueryMap, RequestContext, ResponseContext, TargetType};
/// use microweb_router::{bind, ParamSpec};
///
/// let specs = vec![
///     ParamSpec::request(),
///     ParamSpec::query("page", TargetType::Int).default_value("1"),
///     ParamSpec::query("verbose", TargetType::Bool),
/// ];
/// let req = RequestContext::get("/items?verbose=TRUE");
/// let resp = ResponseContext::new();
/// let args = bind(&specs, &req, &resp, &req.query_values());
///
/// assert_eq!(args.request(0).unwrap().path(), "/items");
/// assert_eq!(args.int(1).unwrap(), 1);
/// assert!(args.bool(2).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Args<'r> {
    args: Vec<Arg<'r>>,
}

impl<'r> Args<'r> {
    /// Number of bound arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns true if the mapping declared no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Returns the raw argument at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arg<'r>> {
        self.args.get(index)
    }

    /// Iterates over the arguments in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Arg<'r>> {
        self.args.iter()
    }

    fn at(&self, index: usize) -> HandlerResult<&Arg<'r>> {
        self.args.get(index).ok_or_else(|| {
            HandlerError::new(
                "ArgumentMismatch",
                format!("argument {index} was not declared"),
            )
        })
    }

    fn value(&self, index: usize, expected: &str) -> HandlerResult<&Value> {
        match self.at(index)? {
            Arg::Value(value) => Ok(value),
            other => Err(HandlerError::argument_mismatch(index, expected, other.kind())),
        }
    }

    /// The request context at `index`.
    pub fn request(&self, index: usize) -> HandlerResult<&'r RequestContext> {
        match self.at(index)? {
            Arg::Request(req) => Ok(req),
            other => Err(HandlerError::argument_mismatch(
                index,
                "RequestContext",
                other.kind(),
            )),
        }
    }

    /// The response context at `index`.
    pub fn response(&self, index: usize) -> HandlerResult<&'r ResponseContext> {
        match self.at(index)? {
            Arg::Response(resp) => Ok(resp),
            other => Err(HandlerError::argument_mismatch(
                index,
                "ResponseContext",
                other.kind(),
            )),
        }
    }

    /// A `String` parameter.
    pub fn text(&self, index: usize) -> HandlerResult<&str> {
        let value = self.value(index, "String")?;
        value
            .as_text()
            .ok_or_else(|| HandlerError::argument_mismatch(index, "String", value.kind()))
    }

    /// A `String` parameter that may be unbound.
    pub fn opt_text(&self, index: usize) -> HandlerResult<Option<&str>> {
        match self.value(index, "String")? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s)),
            other => Err(HandlerError::argument_mismatch(index, "String", other.kind())),
        }
    }

    /// An `Int` parameter.
    pub fn int(&self, index: usize) -> HandlerResult<i32> {
        let value = self.value(index, "Int")?;
        value
            .as_int()
            .ok_or_else(|| HandlerError::argument_mismatch(index, "Int", value.kind()))
    }

    /// A `Long` parameter.
    pub fn long(&self, index: usize) -> HandlerResult<i64> {
        let value = self.value(index, "Long")?;
        value
            .as_long()
            .ok_or_else(|| HandlerError::argument_mismatch(index, "Long", value.kind()))
    }

    /// A `Bool` parameter.
    pub fn bool(&self, index: usize) -> HandlerResult<bool> {
        let value = self.value(index, "Bool")?;
        value
            .as_bool()
            .ok_or_else(|| HandlerError::argument_mismatch(index, "Bool", value.kind()))
    }
}

impl<'r> FromIterator<Arg<'r>> for Args<'r> {
    fn from_iter<I: IntoIterator<Item = Arg<'r>>>(iter: I) -> Self {
        Self {
            args: iter.into_iter().collect(),
        }
    }
}

/// Builds the argument list for one invocation, in declaration order.
pub fn bind<'r>(
    specs: &[ParamSpec],
    request: &'r RequestContext,
    response: &'r ResponseContext,
    query: &QueryMap,
) -> Args<'r> {
    specs
        .iter()
        .map(|spec| match spec.source() {
            SourceKind::RequestContext => Arg::Request(request),
            SourceKind::ResponseContext => Arg::Response(response),
            SourceKind::QueryParam => Arg::Value(resolve_query(spec, query)),
            SourceKind::Unbound => Arg::Value(Value::Null),
        })
        .collect()
}

/// Resolves a query parameter: explicit non-empty value, else the declared
/// default, else the empty string; then coerces.
fn resolve_query(spec: &ParamSpec, query: &QueryMap) -> Value {
    let provided = spec
        .query_key()
        .and_then(|key| query.get(key))
        .filter(|v| !v.is_empty());
    let raw = provided
        .or_else(|| spec.declared_default())
        .unwrap_or_default();
    spec.target().unwrap_or(TargetType::String).coerce(raw)
}
