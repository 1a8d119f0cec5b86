//! Availability monitor binary: one check, one optional restart, then exit

use clap::Parser;
use hello_watchdog::config::{CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use hello_watchdog::{Component, Logging, Monitor, MonitorConfig, Result, RunOutcome, Systemctl};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "hello-monitor", version, about = "Checks hello-app and restarts it if unreachable")]
struct Args {
    /// Path to the INI configuration file
    #[arg(long, env = CONFIG_PATH_ENV, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match MonitorConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            let _logging = Logging::new(Component::Monitor).set_default()?;
            error!("Cannot load {}: {}", args.config.display(), e);
            std::process::exit(1);
        }
    };

    let _logging = Logging::new(Component::Monitor)
        .with_log_file(config.log_file.clone())
        .set_default()?;

    info!(
        "Starting monitor. URL={}, service={}",
        config.url, config.service_name
    );

    let manager = Systemctl::new(config.systemctl.clone(), config.restart_timeout);
    let monitor = Monitor::new(config, manager)?;

    match monitor.run_once().await {
        RunOutcome::NoActionNeeded(_) => info!("Monitor run finished"),
        RunOutcome::RecoveryAttempted(check, recovery) => info!(
            "Monitor run finished after restart attempt (probe: {}, restarted: {})",
            check
                .diagnostic
                .map(|d| d.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            recovery.is_restarted()
        ),
    }

    Ok(())
}
