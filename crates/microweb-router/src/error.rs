//! Registration errors.
//!
//! Every variant is a configuration error: it surfaces at startup, before
//! the transport accepts connections, and is never retried.

use microweb_core::ReturnType;
use thiserror::Error;

/// Errors raised while discovering, instantiating or registering controllers.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A GET mapping declared a return type other than text.
    #[error("GET mapping {controller}#{method} ({path}) must return text, declared {returns}")]
    NonTextReturn {
        /// Controller type path.
        controller: String,
        /// Mapping name.
        method: String,
        /// Normalised path.
        path: String,
        /// The declared return type.
        returns: ReturnType,
    },

    /// A GET mapping was declared without a handler.
    #[error("GET mapping {controller}#{method} ({path}) has no handler")]
    MissingHandler {
        /// Controller type path.
        controller: String,
        /// Mapping name.
        method: String,
        /// Normalised path.
        path: String,
    },

    /// Two mappings share a path and duplicates are rejected.
    #[error("duplicate GET route {path}: {existing} and {duplicate}")]
    DuplicateRoute {
        /// Normalised path.
        path: String,
        /// `Controller#method` already bound to the path.
        existing: String,
        /// `Controller#method` that tried to bind it again.
        duplicate: String,
    },

    /// A controller could not be constructed.
    #[error("failed to instantiate controller {controller}: {message}")]
    Instantiation {
        /// Controller type path.
        controller: String,
        /// Failure reason.
        message: String,
    },

    /// A named controller is not in the catalog.
    #[error("unknown controller: {name}")]
    UnknownController {
        /// The requested name.
        name: String,
    },

    /// A short controller name matches more than one catalog entry.
    #[error("ambiguous controller name {name}, candidates: {}", candidates.join(", "))]
    AmbiguousController {
        /// The requested name.
        name: String,
        /// Matching type paths.
        candidates: Vec<String>,
    },
}

impl RegistryError {
    /// Creates an instantiation error.
    pub fn instantiation(controller: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Instantiation {
            controller: controller.into(),
            message: message.into(),
        }
    }

    /// Creates an unknown-controller error.
    pub fn unknown_controller(name: impl Into<String>) -> Self {
        Self::UnknownController { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_text_return_display() {
        let err = RegistryError::NonTextReturn {
            controller: "app::Counter".into(),
            method: "count".into(),
            path: "/count".into(),
            returns: ReturnType::Int,
        };
        assert_eq!(
            err.to_string(),
            "GET mapping app::Counter#count (/count) must return text, declared Int"
        );
    }

    #[test]
    fn test_ambiguous_display() {
        let err = RegistryError::AmbiguousController {
            name: "Hello".into(),
            candidates: vec!["a::Hello".into(), "b::Hello".into()],
        };
        assert_eq!(
            err.to_string(),
            "ambiguous controller name Hello, candidates: a::Hello, b::Hello"
        );
    }
}
