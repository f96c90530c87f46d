use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("failed to read script {path}")]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write render output")]
    Output(#[from] std::io::Error),
    #[error("script line {line}: {message}")]
    Script { line: usize, message: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

/// Integration mistakes. These are never raised for stale toast ids, which
/// are silently ignored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("toast manager must be started from within a tokio runtime")]
    NoRuntime,
    #[error("toast manager has been shut down")]
    Stopped,
}

impl Error {
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Usage(UsageError::Stopped))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, Error, UsageError};

    #[test]
    fn config_error_names_the_field() {
        let err = Error::from(ConfigError::InvalidField {
            field: "toast.limit",
            message: "limit must be greater than zero".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "invalid configuration for toast.limit: limit must be greater than zero"
        );
    }

    #[test]
    fn stopped_is_detected() {
        assert!(Error::from(UsageError::Stopped).is_stopped());
        assert!(!Error::from(UsageError::NoRuntime).is_stopped());
    }
}
