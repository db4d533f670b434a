//! Exact-path GET route table.

use std::collections::HashMap;
use std::fmt;

use microweb_core::{DispatchFn, RouteSink};

/// The transport's GET table, filled through [`RouteSink`].
///
/// Lookup is by exact path; the query string is never part of the key.
/// A later `get` for the same path replaces the earlier entry.
#[derive(Default, Clone)]
pub struct GetRoutes {
    routes: HashMap<String, DispatchFn>,
}

impl GetRoutes {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the dispatch entry for `path`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&DispatchFn> {
        self.routes.get(path)
    }

    /// Number of bound paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Bound paths, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

impl RouteSink for GetRoutes {
    fn get(&mut self, path: &str, dispatch: DispatchFn) {
        if self.routes.insert(path.to_string(), dispatch).is_some() {
            tracing::debug!(path = %path, "replaced transport route");
        }
    }
}

impl fmt::Debug for GetRoutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GetRoutes").field("paths", &self.paths()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microweb_core::{RequestContext, ResponseContext};
    use std::sync::Arc;

    fn fixed(body: &'static str) -> DispatchFn {
        Arc::new(move |_: &RequestContext, _: &ResponseContext| body.to_string())
    }

    #[test]
    fn test_exact_lookup() {
        let mut routes = GetRoutes::new();
        routes.get("/hello", fixed("hi"));

        let ctx = RequestContext::get("/hello?name=x");
        let dispatch = routes.lookup(ctx.path()).unwrap();
        assert_eq!(dispatch(&ctx, &ResponseContext::new()), "hi");
        assert!(routes.lookup("/hello/").is_none());
        assert!(routes.lookup("/hello?name=x").is_none());
    }

    #[test]
    fn test_last_binding_wins() {
        let mut routes = GetRoutes::new();
        routes.get("/x", fixed("first"));
        routes.get("/x", fixed("second"));

        assert_eq!(routes.len(), 1);
        let dispatch = routes.lookup("/x").unwrap();
        assert_eq!(dispatch(&RequestContext::get("/x"), &ResponseContext::new()), "second");
    }

    #[test]
    fn test_paths_sorted() {
        let mut routes = GetRoutes::new();
        routes.get("/b", fixed(""));
        routes.get("/a", fixed(""));
        assert_eq!(routes.paths(), vec!["/a", "/b"]);
        assert!(!routes.is_empty());
    }
}
