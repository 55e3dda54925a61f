/*
[INPUT]:  CLI arguments, YAML configuration file, TASKR_* environment
[OUTPUT]: One task or account command run against the TaskR backend
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or logging setup
*/

mod cli;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Command;
use taskr::AppConfig;

const LOG_FILE_PREFIX: &str = "taskr.log";

#[derive(Parser, Debug)]
#[command(name = "taskr", version, about = "TaskR to-do list client")]
struct Cli {
    /// Configuration file (defaults to the per-user config.yaml when present)
    #[arg(long = "config", value_name = "PATH", global = true)]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            cli::report_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    if let Command::Init { output } = args.command {
        let _guard = init_tracing(&args.log_level, None)?;
        return cli::init::run_init(output);
    }

    let config = AppConfig::load(args.config_path.as_deref()).context("load configuration")?;
    let data_dir = config.data_dir()?;
    let _guard = init_tracing(&args.log_level, Some(&data_dir))?;

    tracing::debug!(
        base_url = %config.api.base_url,
        flavor = ?config.api.flavor,
        data_dir = %data_dir.display(),
        "configuration loaded"
    );

    cli::execute(args.command, config, data_dir).await
}

/// Console output on stderr plus a daily log file under `<data_dir>/logs`
fn init_tracing(log_level: &str, data_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).context("invalid RUST_LOG")?
        }
        _ => EnvFilter::try_new(log_level).context("invalid log level")?,
    };

    let (file_layer, guard) = match data_dir {
        Some(dir) => {
            let log_dir = dir.join("logs");
            std::fs::create_dir_all(&log_dir)
                .with_context(|| format!("create log directory {}", log_dir.display()))?;
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(guard)
}
