//! The bundled web application.
//!
//! Every controller the binary can serve is listed in [`catalog`]. Their
//! type paths live under `microweb::webapp`, the default base namespace
//! scanned when no controllers are named on the command line.

pub mod controllers;

use microweb_router::ControllerCatalog;

use controllers::{GreetingController, HelloApiController, HelloController, StocksApiController};

/// Namespace the bundled controllers live in.
pub const BASE_NAMESPACE: &str = "microweb::webapp";

/// All bundled controllers, in registration order.
#[must_use]
pub fn catalog() -> ControllerCatalog {
    ControllerCatalog::new()
        .with::<HelloController>()
        .with::<GreetingController>()
        .with::<HelloApiController>()
        .with::<StocksApiController>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_controllers_under_base_namespace() {
        let catalog = catalog();
        assert_eq!(catalog.discover(BASE_NAMESPACE).len(), catalog.len());
        assert!(catalog
            .iter()
            .all(|d| d.type_name().starts_with("microweb::webapp::controllers::")));
    }

    #[test]
    fn test_find_by_simple_name() {
        let catalog = catalog();
        for name in [
            "HelloController",
            "GreetingController",
            "HelloApiController",
            "StocksApiController",
        ] {
            assert_eq!(catalog.find(name).unwrap().simple_name(), name);
        }
    }
}
