use std::str::FromStr;

use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt};

use crate::Result;
use crate::error::Error;

const FALLBACK_FILTER: &str = "info";

/// Format de sortie des logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    /// Nécessite la fonctionnalité `json-logs`.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Premier filtre valide parmi le filtre explicite, `RUST_LOG`, puis `info`.
fn resolve_filter(explicit: Option<&str>) -> Result<EnvFilter> {
    explicit
        .map(str::to_string)
        .into_iter()
        .chain(std::env::var("RUST_LOG").ok())
        .chain(std::iter::once(FALLBACK_FILTER.to_string()))
        .find_map(|candidate| EnvFilter::try_new(candidate).ok())
        .ok_or_else(|| Error::Telemetry("invalid log filter".to_string()))
}

/// Initialise tracing avec un filtre optionnel et le format demandé.
///
/// # Errors
///
/// Retourne une erreur si la couche JSON est demandée alors que la
/// fonctionnalité n'est pas compilée, ou si l'installation du subscriber
/// global échoue.
pub fn init_tracing(explicit_filter: Option<&str>, format: LogFormat) -> Result<()> {
    let filter = resolve_filter(explicit_filter)?;

    match format {
        #[cfg(feature = "json-logs")]
        LogFormat::Json => {
            let subscriber = Registry::default().with(filter).with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .json()
                    .flatten_event(true),
            );
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|err| Error::Telemetry(err.to_string()))
        }
        #[cfg(not(feature = "json-logs"))]
        LogFormat::Json => Err(Error::Telemetry(
            "binary was built without the `json-logs` feature".to_string(),
        )),
        LogFormat::Text => {
            // stdout porte les frames, les logs vont sur stderr.
            let subscriber = Registry::default().with(filter).with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            );
            tracing::subscriber::set_global_default(subscriber)
                .map_err(|err| Error::Telemetry(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LogFormat, resolve_filter};
    use std::str::FromStr;

    #[test]
    fn log_format_parses_names() {
        assert_eq!(LogFormat::from_str("JSON"), Ok(LogFormat::Json));
        assert_eq!(LogFormat::from_str("text"), Ok(LogFormat::Text));
        assert!(LogFormat::from_str("xml").is_err());
    }

    #[test]
    fn explicit_filter_is_accepted() {
        assert!(resolve_filter(Some("toaster=debug")).is_ok());
        assert!(resolve_filter(None).is_ok());
    }
}
