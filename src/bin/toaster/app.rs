use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use tokio::signal;
use tokio::time::{Instant, sleep};
use toaster::Result;
use toaster::config::{Config, ToastConfig};
use toaster::error::Error as ToastError;
use toaster::telemetry::{LogFormat, init_tracing};
use toaster::toast::layout::{Stack, stacks};
use toaster::{ToastHandle, Toaster};
use tracing::{debug, info};

use super::cli::Cli;
use super::script::{Script, Step};

const DEFAULT_CONFIG: &str = "toaster.toml";

pub async fn run(cli: Cli) -> Result<()> {
    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_tracing(cli.log_filter.as_deref(), format)?;

    let (config_path, required) = cli
        .config
        .clone()
        .map_or_else(|| (PathBuf::from(DEFAULT_CONFIG), false), |path| (path, true));
    let config = Config::from_env_and_file(&config_path, required)?;
    let toast_config = apply_cli_overrides(&config.toast, &cli)?;

    let script = Script::load(&cli.script)?;
    info!(
        script = %cli.script.display(),
        steps = script.steps().len(),
        "replaying toast script"
    );

    let toaster = Toaster::spawn(toast_config)?;
    let mut stdout = std::io::stdout().lock();

    let outcome = tokio::select! {
        biased;
        _ = signal::ctrl_c() => {
            info!("interrupt received, stopping replay");
            Ok(())
        }
        res = replay(&toaster, &script, &mut stdout) => res,
    };

    toaster.shutdown().await;
    outcome
}

fn apply_cli_overrides(config: &ToastConfig, cli: &Cli) -> Result<ToastConfig> {
    Ok(ToastConfig::new(
        cli.limit.unwrap_or_else(|| config.limit()),
        cli.duration.unwrap_or_else(|| config.default_duration()),
        cli.position.unwrap_or_else(|| config.default_position()),
    )?
    .with_exit_delay(config.exit_delay()))
}

#[derive(Serialize)]
struct Frame {
    line: usize,
    elapsed_ms: u64,
    stacks: Vec<Stack>,
}

/// Runs every step in order, writing one JSON frame per `render` step.
pub async fn replay<W: Write>(toaster: &Toaster, script: &Script, out: &mut W) -> Result<()> {
    let started = Instant::now();
    let mut handles: HashMap<String, ToastHandle> = HashMap::new();

    for (line, step) in script.steps() {
        let line = *line;
        match step {
            Step::Notify(notify) => {
                let handle = toaster.notify(notify.to_spec())?;
                debug!(line, key = %notify.key, toast_id = %handle.id(), "toast queued");
                handles.insert(notify.key.clone(), handle);
            }
            Step::Update(update) => handle(&handles, &update.key, line)?.update(update.to_update())?,
            Step::Dismiss(target) => handle(&handles, &target.key, line)?.dismiss()?,
            Step::DismissAll => toaster.dismiss_all()?,
            Step::Pause(target) => handle(&handles, &target.key, line)?.pause()?,
            Step::Resume(target) => handle(&handles, &target.key, line)?.resume()?,
            Step::Sleep(pause) => sleep(pause.duration).await,
            Step::Render => {
                let toasts = toaster.toasts().await?;
                let now = Instant::now();
                let frame = Frame {
                    line,
                    elapsed_ms: u64::try_from(now.duration_since(started).as_millis())
                        .unwrap_or(u64::MAX),
                    stacks: stacks(&toasts, now),
                };
                serde_json::to_writer(&mut *out, &frame).map_err(std::io::Error::from)?;
                writeln!(out)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}

fn handle<'a>(
    handles: &'a HashMap<String, ToastHandle>,
    key: &str,
    line: usize,
) -> Result<&'a ToastHandle> {
    handles.get(key).ok_or_else(|| ToastError::Script {
        line,
        message: format!("unknown toast key `{key}`"),
    })
}
