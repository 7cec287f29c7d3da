//! Error types for the log rotation watchdog.
//!
//! Inside a tick every error is scoped to a setting, a file or a phase and is
//! logged rather than propagated. Only [`Error::InvalidDefault`] is fatal.

/// Result type for watchdog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Watchdog errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A single rotation setting failed validation.
    #[error("Invalid configuration value '{key}' ({value}): {reason}")]
    ConfigValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A compiled-in default failed validation.
    #[error("invalid built-in default for '{key}': {source}")]
    InvalidDefault {
        key: String,
        #[source]
        source: Box<Error>,
    },

    /// IO error with context.
    #[error("IO error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A watched path is not valid UTF-8 and cannot be stem-stripped.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    /// The process inventory could not be listed.
    #[error("inventory error: {0}")]
    Inventory(String),

    /// The supervisor could not be asked to reopen its logs.
    #[error("supervisor error: {0}")]
    Supervisor(String),
}

impl Error {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a setting validation error.
    pub fn config_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ConfigValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns true when this is an IO error of kind `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_value_message_names_key_and_value() {
        let err = Error::config_value("max_size", "-3MB", "must be positive");
        let msg = err.to_string();
        assert!(msg.contains("'max_size'"));
        assert!(msg.contains("-3MB"));
    }

    #[test]
    fn test_is_not_found() {
        let err = Error::io(
            "stat",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_not_found());

        let err = Error::io(
            "stat",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(!err.is_not_found());
    }
}
