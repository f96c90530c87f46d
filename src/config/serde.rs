use std::time::Duration;

use humantime::{format_duration, parse_duration};
use serde::Deserialize;
use serde_with::{DeserializeAs, SerializeAs};

/// `serde_with` adapter reading durations such as `"3s"` or `"300ms"`.
pub struct HumantimeDuration;

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

impl SerializeAs<Duration> for HumantimeDuration {
    fn serialize_as<S>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format_duration(*value).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::HumantimeDuration;
    use serde::{Deserialize, Serialize};
    use serde_with::serde_as;
    use std::time::Duration;

    #[serde_as]
    #[derive(Deserialize, Serialize)]
    struct Sample {
        #[serde_as(as = "HumantimeDuration")]
        delay: Duration,
    }

    #[test]
    fn parses_millisecond_strings() {
        let sample: Sample = match serde_json::from_str(r#"{"delay":"300ms"}"#) {
            Ok(value) => value,
            Err(err) => panic!("failed to parse sample json: {err}"),
        };
        assert_eq!(sample.delay, Duration::from_millis(300));
    }

    #[test]
    fn rejects_bare_numbers() {
        assert!(serde_json::from_str::<Sample>(r#"{"delay":"3000"}"#).is_err());
    }

    #[test]
    fn serializes_back_to_humantime() {
        let sample = Sample {
            delay: Duration::from_secs(3),
        };
        let json = serde_json::to_string(&sample).unwrap_or_default();
        assert_eq!(json, r#"{"delay":"3s"}"#);
    }
}
