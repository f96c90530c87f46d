use std::collections::HashMap;
use std::time::Duration;

use humantime::parse_duration;

use crate::error::ConfigError;

/// Where environment overrides are read from.
#[derive(Debug, Clone, Default)]
pub(super) enum Vars {
    #[default]
    Process,
    Fixed(HashMap<String, String>),
}

impl Vars {
    fn get(&self, key: &'static str) -> std::result::Result<Option<String>, ConfigError> {
        match self {
            Self::Process => match std::env::var(key) {
                Ok(value) => Ok(Some(value)),
                Err(std::env::VarError::NotPresent) => Ok(None),
                Err(err) => Err(ConfigError::Other(format!("{key}: {err}"))),
            },
            Self::Fixed(map) => Ok(map.get(key).cloned()),
        }
    }

    /// Map handed to `config::Environment`; `None` reads the process.
    pub(super) fn snapshot(&self) -> Option<HashMap<String, String>> {
        match self {
            Self::Process => None,
            Self::Fixed(map) => Some(map.clone()),
        }
    }
}

pub(super) fn env_string(
    vars: &Vars,
    key: &'static str,
) -> std::result::Result<Option<String>, ConfigError> {
    Ok(vars
        .get(key)?
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

pub(super) fn env_parse<T>(
    vars: &Vars,
    key: &'static str,
) -> std::result::Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_string(vars, key)?
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|err| ConfigError::InvalidField {
                    field: key,
                    message: err.to_string(),
                })
        })
        .transpose()
}

pub(super) fn env_duration(
    vars: &Vars,
    key: &'static str,
) -> std::result::Result<Option<Duration>, ConfigError> {
    env_string(vars, key)?
        .map(|value| {
            parse_duration(&value).map_err(|err| ConfigError::InvalidField {
                field: key,
                message: err.to_string(),
            })
        })
        .transpose()
}
