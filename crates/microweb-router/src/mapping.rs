//! Controller and mapping declarations.

use crate::binder::Args;
use crate::param::ParamSpec;
use microweb_core::{HandlerResult, ReturnType, Value};
use std::fmt;
use std::sync::Arc;

/// A bound handler closure.
pub type HandlerFn = Arc<dyn for<'r> Fn(&Args<'r>) -> HandlerResult<Value> + Send + Sync>;

/// A type that declares GET mappings.
///
/// One instance is shared by every route it declares and by every
/// concurrent request to those routes. Any mutable state is the
/// controller's own concern (atomics, locks).
///
/// # Example
///
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use std::sync::Arc;
/// use microweb_router::{Controller, Mapping};
///
/// #[derive(Default)]
/// struct Visits {
///     count: AtomicU64,
/// }
///
/// impl Controller for Visits {
///     fn mappings(self: Arc<Self>) -> Vec<Mapping> {
///         vec![Mapping::get("/visits").text(move |_| {
///             Ok(format!("{}", self.count.fetch_add(1, Ordering::Relaxed) + 1))
///         })]
///     }
/// }
/// ```
pub trait Controller: Send + Sync + 'static {
    /// Declares the controller's GET mappings.
    fn mappings(self: Arc<Self>) -> Vec<Mapping>;

    /// The controller's type path, used in logs and diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A single GET mapping: path, ordered parameters and handler.
///
/// Use [`Mapping::text`] for handlers producing a textual body. Other return
/// types can be declared with [`Mapping::returning`] but are rejected when
/// the controller is registered.
#[derive(Clone)]
pub struct Mapping {
    path: String,
    name: Option<String>,
    params: Vec<ParamSpec>,
    returns: ReturnType,
    handler: Option<HandlerFn>,
}

impl Mapping {
    /// Starts a GET mapping for `path`. The path is normalised on registration.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            params: Vec::new(),
            returns: ReturnType::Text,
            handler: None,
        }
    }

    /// Names the mapping, shown in route logs as `Controller#name`.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a declared parameter.
    #[must_use]
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Appends several declared parameters.
    #[must_use]
    pub fn params(mut self, specs: impl IntoIterator<Item = ParamSpec>) -> Self {
        self.params.extend(specs);
        self
    }

    /// Sets a handler returning a textual body.
    #[must_use]
    pub fn text<F>(mut self, handler: F) -> Self
    where
        F: for<'r> Fn(&Args<'r>) -> HandlerResult<String> + Send + Sync + 'static,
    {
        self.returns = ReturnType::Text;
        self.handler = Some(Arc::new(move |args: &Args<'_>| handler(args).map(Value::Text)));
        self
    }

    /// Sets a handler with an explicitly declared return type.
    #[must_use]
    pub fn returning<F>(mut self, returns: ReturnType, handler: F) -> Self
    where
        F: for<'r> Fn(&Args<'r>) -> HandlerResult<Value> + Send + Sync + 'static,
    {
        self.returns = returns;
        self.handler = Some(Arc::new(handler));
        self
    }

    /// The declared (not yet normalised) path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The mapping name, defaulting to `"handler"`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("handler")
    }

    /// The declared parameters.
    #[must_use]
    pub fn param_specs(&self) -> &[ParamSpec] {
        &self.params
    }

    /// The declared return type.
    #[must_use]
    pub const fn returns(&self) -> ReturnType {
        self.returns
    }

    /// The handler, if one was set.
    #[must_use]
    pub fn handler(&self) -> Option<&HandlerFn> {
        self.handler.as_ref()
    }

    pub(crate) fn into_parts(self) -> (String, String, Vec<ParamSpec>, Option<HandlerFn>) {
        let name = self.name().to_string();
        (self.path, name, self.params, self.handler)
    }
}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("path", &self.path)
            .field("name", &self.name())
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microweb_core::TargetType;

    #[test]
    fn test_mapping_builder() {
        let mapping = Mapping::get("/greeting")
            .named("greeting")
            .param(ParamSpec::query("name", TargetType::String).default_value("World"))
            .text(|args| Ok(format!("Hola {}", args.text(0)?)));

        assert_eq!(mapping.path(), "/greeting");
        assert_eq!(mapping.name(), "greeting");
        assert_eq!(mapping.param_specs().len(), 1);
        assert_eq!(mapping.returns(), ReturnType::Text);
        assert!(mapping.handler().is_some());
    }

    #[test]
    fn test_mapping_without_handler() {
        let mapping = Mapping::get("x");
        assert_eq!(mapping.name(), "handler");
        assert!(mapping.handler().is_none());
    }

    #[test]
    fn test_returning_records_type() {
        let mapping = Mapping::get("/count").returning(ReturnType::Int, |_| Ok(Value::Int(1)));
        assert_eq!(mapping.returns(), ReturnType::Int);
    }

    #[test]
    fn test_controller_default_name_is_type_path() {
        struct Probe;
        impl Controller for Probe {
            fn mappings(self: Arc<Self>) -> Vec<Mapping> {
                Vec::new()
            }
        }
        assert!(Probe.name().ends_with("Probe"));
    }
}
