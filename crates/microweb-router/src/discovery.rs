//! Controller discovery.
//!
//! Controllers are listed explicitly in a [`ControllerCatalog`] at compile
//! time. [`ControllerCatalog::discover`] selects the entries whose type path
//! lives under a base namespace, the way a package scan would, without any
//! filesystem or runtime type introspection.

use crate::error::RegistryError;
use crate::mapping::Controller;
use microweb_core::short_type_name;
use std::fmt;
use std::sync::Arc;

type Factory = Box<dyn Fn() -> Result<Arc<dyn Controller>, String> + Send + Sync>;

/// A catalog entry: a controller's type path and how to build it.
pub struct ControllerDescriptor {
    type_name: String,
    factory: Factory,
}

impl ControllerDescriptor {
    /// Describes a controller built with `Default`.
    #[must_use]
    pub fn of<T: Controller + Default>() -> Self {
        Self {
            type_name: std::any::type_name::<T>().to_string(),
            factory: Box::new(|| Ok(Arc::new(T::default()) as Arc<dyn Controller>)),
        }
    }

    /// Describes a controller built by a fallible factory.
    pub fn with_factory<T, F>(factory: F) -> Self
    where
        T: Controller,
        F: Fn() -> Result<T, String> + Send + Sync + 'static,
    {
        Self::named(std::any::type_name::<T>(), move || {
            factory().map(|c| Arc::new(c) as Arc<dyn Controller>)
        })
    }

    /// Describes a controller under an explicit type path.
    pub fn named<F>(type_name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Controller>, String> + Send + Sync + 'static,
    {
        Self {
            type_name: type_name.into(),
            factory: Box::new(factory),
        }
    }

    /// The full type path, e.g. `microweb::webapp::controllers::HelloController`.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The last path segment of the type path.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        short_type_name(&self.type_name)
    }

    /// Builds the controller instance.
    pub fn instantiate(&self) -> Result<Arc<dyn Controller>, RegistryError> {
        (self.factory)().map_err(|message| RegistryError::instantiation(&self.type_name, message))
    }

    fn is_resolvable(&self) -> bool {
        let base = self.type_name.split('<').next().unwrap_or_default();
        !base.is_empty()
            && base.split("::").all(|segment| {
                let mut chars = segment.chars();
                chars
                    .next()
                    .is_some_and(|c| c.is_alphabetic() || c == '_')
                    && chars.all(|c| c.is_alphanumeric() || c == '_')
            })
    }

    fn in_namespace(&self, namespace: &str) -> bool {
        namespace.is_empty()
            || self.type_name == namespace
            || self
                .type_name
                .strip_prefix(namespace)
                .is_some_and(|rest| rest.starts_with("::"))
    }
}

impl fmt::Debug for ControllerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerDescriptor")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// The compile-time list of known controllers.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use microweb_router::{Controller, ControllerCatalog, Mapping};
///
/// #[derive(Default)]
/// struct Health;
///
/// impl Controller for Health {
///     fn mappings(self: Arc<Self>) -> Vec<Mapping> {
///         vec![Mapping::get("/health").text(|_| Ok("ok".into()))]
///     }
/// }
///
/// let catalog = ControllerCatalog::new().with::<Health>();
/// assert_eq!(catalog.discover("").len(), 1);
/// assert!(catalog.find("Health").is_ok());
/// ```
#[derive(Debug, Default)]
pub struct ControllerCatalog {
    entries: Vec<ControllerDescriptor>,
}

impl ControllerCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `Default`-constructible controller.
    #[must_use]
    pub fn with<T: Controller + Default>(mut self) -> Self {
        self.entries.push(ControllerDescriptor::of::<T>());
        self
    }

    /// Adds a descriptor.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: ControllerDescriptor) -> Self {
        self.entries.push(descriptor);
        self
    }

    /// Adds a descriptor in place.
    pub fn add(&mut self, descriptor: ControllerDescriptor) {
        self.entries.push(descriptor);
    }

    /// Number of catalog entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over every entry in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ControllerDescriptor> {
        self.entries.iter()
    }

    /// Returns the controllers under `namespace`, in declaration order.
    ///
    /// `namespace` is a Rust path such as `microweb::webapp`; an empty
    /// namespace selects everything. Entries whose type path cannot be
    /// resolved are skipped with a warning. Discovery itself never fails.
    pub fn discover(&self, namespace: &str) -> Vec<&ControllerDescriptor> {
        let namespace = namespace.trim().trim_end_matches("::");
        let found: Vec<&ControllerDescriptor> = self
            .entries
            .iter()
            .filter(|entry| {
                if entry.is_resolvable() {
                    true
                } else {
                    tracing::warn!(type_name = %entry.type_name, "skipping unresolvable controller");
                    false
                }
            })
            .filter(|entry| entry.in_namespace(namespace))
            .collect();

        if found.is_empty() {
            tracing::warn!(namespace = %namespace, "no controllers found");
        } else {
            tracing::debug!(namespace = %namespace, count = found.len(), "discovered controllers");
        }
        found
    }

    /// Resolves an explicitly named controller.
    ///
    /// `name` may be the full type path or, when unambiguous, the simple
    /// type name.
    pub fn find(&self, name: &str) -> Result<&ControllerDescriptor, RegistryError> {
        let name = name.trim();
        if let Some(exact) = self.entries.iter().find(|e| e.type_name == name) {
            return Ok(exact);
        }

        let matches: Vec<&ControllerDescriptor> = self
            .entries
            .iter()
            .filter(|e| e.simple_name() == name || e.type_name.ends_with(&format!("::{name}")))
            .collect();

        match matches.as_slice() {
            [] => Err(RegistryError::unknown_controller(name)),
            [single] => Ok(*single),
            many => Err(RegistryError::AmbiguousController {
                name: name.to_string(),
                candidates: many.iter().map(|e| e.type_name.clone()).collect(),
            }),
        }
    }
}

impl<'a> IntoIterator for &'a ControllerCatalog {
    type Item = &'a ControllerDescriptor;
    type IntoIter = std::slice::Iter<'a, ControllerDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
