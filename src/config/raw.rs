use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;

use crate::Result;
use crate::error::ConfigError;
use crate::types::Position;

use super::defaults::{default_duration, default_exit_delay, default_limit, default_position};
use super::env::{Vars, env_duration, env_parse, env_string};
use super::{Config, HumantimeDuration, ToastConfig};

pub(super) fn load(
    path: impl AsRef<Path>,
    required: bool,
    vars: &Vars,
) -> std::result::Result<RawConfig, ConfigError> {
    let path = path.as_ref();
    let builder = ::config::Config::builder()
        .add_source(::config::File::from(path).required(required))
        .add_source(
            ::config::Environment::with_prefix("TOASTER")
                .separator("__")
                .try_parsing(true)
                .source(vars.snapshot()),
        );

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) toast: RawToast,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawToast {
    #[serde(default = "default_limit")]
    pub(super) limit: usize,
    #[serde(default = "default_duration")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) default_duration: Duration,
    #[serde(default)]
    pub(super) default_position: Option<String>,
    #[serde(default = "default_exit_delay")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) exit_delay: Duration,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(
        &mut self,
        vars: &Vars,
    ) -> std::result::Result<(), ConfigError> {
        if let Some(limit) = env_parse::<usize>(vars, "TOAST_LIMIT")? {
            self.toast.limit = limit;
        }
        if let Some(duration) = env_duration(vars, "TOAST_DURATION")? {
            self.toast.default_duration = duration;
        }
        if let Some(position) = env_string(vars, "TOAST_POSITION")? {
            self.toast.default_position = Some(position);
        }
        if let Some(delay) = env_duration(vars, "TOAST_EXIT_DELAY")? {
            self.toast.exit_delay = delay;
        }
        Ok(())
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        let position = match self.toast.default_position.as_deref() {
            Some(raw) => Position::from_str(raw).map_err(|message| ConfigError::InvalidField {
                field: "toast.default_position",
                message,
            })?,
            None => default_position(),
        };

        let toast = ToastConfig::new(
            self.toast.limit,
            self.toast.default_duration,
            position,
        )?
        .with_exit_delay(self.toast.exit_delay);

        Ok(Config { toast })
    }
}

impl Default for RawToast {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            default_duration: default_duration(),
            default_position: None,
            exit_delay: default_exit_delay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::env::Vars;
    use super::{RawConfig, RawToast};
    use crate::error::{ConfigError, Error};
    use crate::types::Position;
    use std::collections::HashMap;
    use std::time::Duration;

    fn vars(pairs: &[(&str, &str)]) -> Vars {
        Vars::Fixed(
            pairs
                .iter()
                .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn raw(limit: usize, position: Option<&str>) -> RawConfig {
        RawConfig {
            toast: RawToast {
                limit,
                default_position: position.map(str::to_string),
                ..RawToast::default()
            },
        }
    }

    #[test]
    fn builds_from_defaults() {
        let config = match RawConfig::default().validate_and_build() {
            Ok(config) => config,
            Err(err) => panic!("default config rejected: {err}"),
        };
        assert_eq!(config.toast.limit(), 5);
        assert_eq!(config.toast.default_position(), Position::TopCenter);
    }

    #[test]
    fn parses_position_names() {
        let config = match raw(3, Some("bottom-right")).validate_and_build() {
            Ok(config) => config,
            Err(err) => panic!("valid config rejected: {err}"),
        };
        assert_eq!(config.toast.default_position(), Position::BottomRight);
        assert_eq!(config.toast.limit(), 3);
    }

    #[test]
    fn unknown_position_is_a_config_error() {
        let err = raw(3, Some("center")).validate_and_build();
        assert!(matches!(
            err,
            Err(Error::Config(ConfigError::InvalidField {
                field: "toast.default_position",
                ..
            }))
        ));
    }

    #[test]
    fn zero_limit_is_rejected() {
        assert!(raw(0, None).validate_and_build().is_err());
    }

    #[test]
    fn deserializes_humantime_fields() {
        let raw: RawToast = match serde_json::from_str(
            r#"{"limit":2,"default_duration":"1500ms","exit_delay":"0s"}"#,
        ) {
            Ok(raw) => raw,
            Err(err) => panic!("failed to parse raw toast config: {err}"),
        };
        assert_eq!(raw.limit, 2);
        assert_eq!(raw.default_duration, Duration::from_millis(1500));
        assert_eq!(raw.exit_delay, Duration::ZERO);
        assert!(raw.default_position.is_none());
    }

    #[test]
    fn short_overrides_replace_every_field() {
        let mut config = RawConfig::default();
        let overrides = vars(&[
            ("TOAST_LIMIT", "2"),
            ("TOAST_DURATION", "750ms"),
            ("TOAST_POSITION", " bottom-center "),
            ("TOAST_EXIT_DELAY", "0s"),
        ]);
        if let Err(err) = config.apply_env_overrides(&overrides) {
            panic!("overrides rejected: {err}");
        }
        assert_eq!(config.toast.limit, 2);
        assert_eq!(config.toast.default_duration, Duration::from_millis(750));
        assert_eq!(config.toast.default_position.as_deref(), Some("bottom-center"));
        assert_eq!(config.toast.exit_delay, Duration::ZERO);
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut config = raw(4, Some("top-left"));
        if let Err(err) = config.apply_env_overrides(&vars(&[("TOAST_POSITION", "  ")])) {
            panic!("overrides rejected: {err}");
        }
        assert_eq!(config.toast.limit, 4);
        assert_eq!(config.toast.default_position.as_deref(), Some("top-left"));
    }

    #[test]
    fn invalid_duration_override_names_the_variable() {
        let mut config = RawConfig::default();
        let err = config.apply_env_overrides(&vars(&[("TOAST_DURATION", "soon")]));
        assert!(matches!(
            err,
            Err(ConfigError::InvalidField {
                field: "TOAST_DURATION",
                ..
            })
        ));
    }

    #[test]
    fn invalid_limit_override_names_the_variable() {
        let mut config = RawConfig::default();
        let err = config.apply_env_overrides(&vars(&[("TOAST_LIMIT", "many")]));
        assert!(matches!(
            err,
            Err(ConfigError::InvalidField {
                field: "TOAST_LIMIT",
                ..
            })
        ));
    }
}
