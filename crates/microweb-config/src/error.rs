//! Errors raised while loading or validating configuration.

use std::path::PathBuf;
use thiserror::Error;

/// A configuration problem. Every variant is fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("config file {} does not exist", path.display())]
    MissingFile {
        /// The requested path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read config file {}", path.display())]
    Unreadable {
        /// The file being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML, or a key the schema does not know.
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, or a key the schema does not know.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// Neither `.toml` nor `.json`.
    #[error("unsupported config format {0:?} (expected toml or json)")]
    UnsupportedFormat(String),

    /// A value parsed but failed validation.
    #[error("{field}: {reason}")]
    Invalid {
        /// Dotted field path, e.g. `server.http_addr`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An override variable held a value of the wrong shape.
    #[error("environment variable {var}: {reason}")]
    BadEnvVar {
        /// Full variable name.
        var: String,
        /// What was expected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn missing_file(path: impl Into<PathBuf>) -> Self {
        Self::MissingFile { path: path.into() }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_env_var(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BadEnvVar {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// The offending field or variable, when the error names one.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Invalid { field, .. } => Some(field),
            Self::BadEnvVar { var, .. } => Some(var),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_names_the_path() {
        let err = ConfigError::missing_file("/etc/microweb.toml");
        assert_eq!(err.to_string(), "config file /etc/microweb.toml does not exist");
        assert_eq!(err.key(), None);
    }

    #[test]
    fn test_invalid_names_the_field() {
        let err = ConfigError::invalid("server.http_addr", "not a socket address");
        assert_eq!(err.to_string(), "server.http_addr: not a socket address");
        assert_eq!(err.key(), Some("server.http_addr"));
    }

    #[test]
    fn test_bad_env_var() {
        let err = ConfigError::bad_env_var("PORT", "expected port number");
        assert_eq!(err.to_string(), "environment variable PORT: expected port number");
        assert_eq!(err.key(), Some("PORT"));
    }

    #[test]
    fn test_unreadable_keeps_source() {
        use std::error::Error as _;

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConfigError::unreadable("microweb.toml", io);
        assert!(err.source().is_some());
    }
}
