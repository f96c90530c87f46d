use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use crate::Result;
use crate::error::{ConfigError, Error as ToastError};
use crate::types::Position;

mod defaults;
mod env;
mod raw;
mod serde;

pub use self::serde::HumantimeDuration;

/// Process-wide settings of the toast queue. Validated once, immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastConfig {
    limit: NonZeroUsize,
    default_duration: Duration,
    default_position: Position,
    exit_delay: Duration,
}

impl ToastConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when `limit` or
    /// `default_duration` is zero.
    pub fn new(limit: usize, default_duration: Duration, default_position: Position) -> Result<Self> {
        let limit = NonZeroUsize::new(limit).ok_or_else(|| ConfigError::InvalidField {
            field: "toast.limit",
            message: "limit must be greater than zero".to_string(),
        })?;
        if default_duration.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "toast.default_duration",
                message: "duration must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(Self {
            limit,
            default_duration,
            default_position,
            exit_delay: defaults::default_exit_delay(),
        })
    }

    /// Overrides the delay between a toast closing and its removal.
    #[must_use]
    pub const fn with_exit_delay(mut self, exit_delay: Duration) -> Self {
        self.exit_delay = exit_delay;
        self
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit.get()
    }

    #[must_use]
    pub const fn default_duration(&self) -> Duration {
        self.default_duration
    }

    #[must_use]
    pub const fn default_position(&self) -> Position {
        self.default_position
    }

    #[must_use]
    pub const fn exit_delay(&self) -> Duration {
        self.exit_delay
    }
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            limit: NonZeroUsize::new(defaults::default_limit()).unwrap_or(NonZeroUsize::MIN),
            default_duration: defaults::default_duration(),
            default_position: defaults::default_position(),
            exit_delay: defaults::default_exit_delay(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub toast: ToastConfig,
}

impl Config {
    /// Load configuration from an optional TOML file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is required but missing, cannot be
    /// parsed, when environment overrides are invalid, or when the resulting
    /// values fail validation.
    pub fn from_env_and_file(path: impl AsRef<Path>, required: bool) -> Result<Self> {
        Self::load(path, required, &env::Vars::Process)
    }

    /// Defaults, then the file, then `TOASTER__*`, then the short `TOAST_*`
    /// overrides.
    fn load(path: impl AsRef<Path>, required: bool, vars: &env::Vars) -> Result<Self> {
        let mut raw = raw::load(path, required, vars).map_err(ToastError::from)?;
        raw.apply_env_overrides(vars).map_err(ToastError::from)?;
        raw.validate_and_build()
    }
}
