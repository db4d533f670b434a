//! Handler failures.
//!
//! A [`HandlerError`] is what a handler returns instead of a body. The
//! registry turns it into an internal-error body carrying the error's kind
//! and message, so a failing handler never takes down request processing.
//!
//! Any `std::error::Error` converts into a `HandlerError` with `?`; the kind
//! is the short name of the source error type.

use std::any::Any;
use std::fmt;

/// Result type for handler closures.
pub type HandlerResult<T> = Result<T, HandlerError>;

/// A failure raised while a handler runs.
///
/// # Example
///
/// ```
/// use microweb_core::HandlerError;
///
/// fn parse(raw: &str) -> Result<u8, HandlerError> {
///     Ok(raw.parse::<u8>()?)
/// }
///
/// let err = parse("300").unwrap_err();
/// assert_eq!(err.kind(), "ParseIntError");
///
/// let err = HandlerError::new("IllegalState", "counter overflow");
/// assert_eq!(err.to_string(), "IllegalState: counter overflow");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    kind: String,
    message: String,
}

impl HandlerError {
    /// Creates an error with an explicit kind.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Creates a generic handler failure.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new("HandlerError", message)
    }

    /// A handler asked for an argument with a different type than declared.
    pub fn argument_mismatch(index: usize, expected: &str, found: &str) -> Self {
        Self::new(
            "ArgumentMismatch",
            format!("argument {index}: expected {expected}, found {found}"),
        )
    }

    /// Builds an error from a caught panic payload.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "handler panicked".to_string());
        Self::new("Panic", message)
    }

    /// The failure kind, usually a short type name.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl<E> From<E> for HandlerError
where
    E: std::error::Error + 'static,
{
    fn from(err: E) -> Self {
        Self::new(short_type_name(std::any::type_name::<E>()), err.to_string())
    }
}

/// Strips the module path and generic arguments from a type name.
///
/// ```
/// use microweb_core::short_type_name;
///
/// assert_eq!(short_type_name("core::num::error::ParseIntError"), "ParseIntError");
/// assert_eq!(short_type_name("app::Wrapper<alloc::string::String>"), "Wrapper");
/// assert_eq!(short_type_name("Plain"), "Plain");
/// ```
#[must_use]
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
