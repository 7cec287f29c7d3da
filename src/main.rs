//! mik-logrotate - log rotation watchdog for supervised processes.
//!
//! - `mik-logrotate run`: poll and rotate until interrupted
//! - `mik-logrotate once`: run a single tick and print its report
//! - `mik-logrotate check`: print the effective rotation policy
//!
//! See `mik-logrotate --help` for full usage information.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mik_logrotate::config::{RotationPolicy, WatchdogConfig, default_settings, parse};
use mik_logrotate::logging::{LogConfig, LogFormat, init_logging};
use mik_logrotate::orchestrator::{Orchestrator, TickReport};
use mik_logrotate::rotation::SystemClock;
use mik_logrotate::worker::{Worker, shutdown_signal};

const AFTER_HELP: &str = "\
EXAMPLES:
  mik-logrotate run                         Watch pm2 processes with ~/.mik/logrotate.toml
  mik-logrotate -c ./logrotate.toml once    Rotate once with a local config
  mik-logrotate check                       Show the effective policy

Rotation settings live in the [rotation] table of the config file.";

#[derive(Parser)]
#[command(name = "mik-logrotate")]
#[command(version)]
#[command(about = "Rotate and prune log files of supervised processes")]
#[command(after_help = AFTER_HELP)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: ~/.mik/logrotate.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll and rotate until interrupted
    Run,
    /// Run a single tick and print its report as JSON
    Once,
    /// Print the effective rotation policy as JSON
    Check,
}

#[derive(Serialize)]
struct OnceOutput<'a> {
    report: &'a TickReport,
    observed_files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogConfig::from_flags(cli.log_format, cli.verbose));

    let config = WatchdogConfig::load(cli.config.as_deref())?;
    let policy = load_policy(&config)?;

    match cli.command {
        Commands::Check => {
            println!("{}", serde_json::to_string_pretty(&policy)?);
        },
        Commands::Once => {
            let mut orchestrator =
                Orchestrator::from_config(&config, policy, Arc::new(SystemClock))?;
            let report = orchestrator.tick().await;
            let output = OnceOutput {
                report: &report,
                observed_files: orchestrator.list_files(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        },
        Commands::Run => {
            let orchestrator =
                Orchestrator::from_config(&config, policy, Arc::new(SystemClock))?;
            let period = Duration::from_secs(config.worker.interval_secs);
            Worker::new(orchestrator, period)
                .run(shutdown_signal())
                .await;
        },
    }

    Ok(())
}

/// Parses `[rotation]` into a policy. Only a broken built-in default is fatal.
fn load_policy(config: &WatchdogConfig) -> Result<RotationPolicy> {
    let policy = parse(&config.rotation_settings(), &default_settings())
        .context("Failed to build rotation policy")?;
    policy.log_effective();
    Ok(policy)
}
