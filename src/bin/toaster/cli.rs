use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::{ArgAction, Parser};
use humantime::parse_duration;
use toaster::types::Position;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replays toast queue scripts", long_about = None)]
pub struct Cli {
    /// Script JSON Lines, une opération par ligne.
    #[arg(long, value_name = "PATH")]
    pub script: PathBuf,

    /// Chemin du fichier de configuration TOML (`toaster.toml` si présent).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Nombre maximal de toasts affichés en même temps.
    #[arg(long, value_parser = clap::value_parser!(usize))]
    pub limit: Option<usize>,

    /// Durée d'affichage par défaut (ex. "3s").
    #[arg(long, value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Position par défaut (ex. "bottom-right").
    #[arg(long, value_parser = Position::from_str)]
    pub position: Option<Position>,

    /// Utilise un layer JSON pour les logs (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Filtre de logs explicite (ex. "toaster=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;
    use std::time::Duration;
    use toaster::types::Position;

    #[test]
    fn parses_overrides() {
        let cli = match Cli::try_parse_from([
            "toaster",
            "--script",
            "demo.jsonl",
            "--limit",
            "3",
            "--duration",
            "1500ms",
            "--position",
            "bottom-left",
        ]) {
            Ok(cli) => cli,
            Err(err) => panic!("failed to parse args: {err}"),
        };
        assert_eq!(cli.limit, Some(3));
        assert_eq!(cli.duration, Some(Duration::from_millis(1500)));
        assert_eq!(cli.position, Some(Position::BottomLeft));
        assert!(!cli.json_logs);
    }

    #[test]
    fn script_is_required() {
        assert!(Cli::try_parse_from(["toaster"]).is_err());
    }
}
