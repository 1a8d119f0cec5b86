//! Configuration management for the availability monitor

use crate::errors::{Result, WatchdogError};
use config::{File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the configuration file path
pub const CONFIG_PATH_ENV: &str = "HELLO_MONITOR_CONFIG";

pub const DEFAULT_CONFIG_PATH: &str = "config.ini";
pub const DEFAULT_LOG_FILE: &str = "monitor.log";
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_RESTART_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SYSTEMCTL: &str = "systemctl";

/// Shape of the INI file as read from disk.
#[derive(Debug, Deserialize)]
struct FileConfig {
    app: AppSection,
    monitor: MonitorSection,
}

#[derive(Debug, Deserialize)]
struct AppSection {
    url: String,
    service_name: String,
}

#[derive(Debug, Deserialize)]
struct MonitorSection {
    log_file: String,
    timeout_secs: u64,
    restart_timeout_secs: u64,
    systemctl: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// URL probed on every run
    pub url: String,

    /// Service identifier handed to the supervisor
    pub service_name: String,

    /// File that log lines are appended to, if any
    pub log_file: Option<PathBuf>,

    /// Upper bound for the reachability probe
    pub probe_timeout: Duration,

    /// Upper bound for the restart command
    pub restart_timeout: Duration,

    /// Supervisor program invoked as `<systemctl> restart <unit>`
    pub systemctl: String,
}

impl MonitorConfig {
    /// Load configuration from an INI file.
    ///
    /// Fails if the file is missing or unreadable, if `app.url` or
    /// `app.service_name` is absent, or if validation rejects a value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let raw: FileConfig = config::Config::builder()
            .set_default("monitor.log_file", DEFAULT_LOG_FILE)?
            .set_default("monitor.timeout_secs", DEFAULT_PROBE_TIMEOUT_SECS as i64)?
            .set_default(
                "monitor.restart_timeout_secs",
                DEFAULT_RESTART_TIMEOUT_SECS as i64,
            )?
            .set_default("monitor.systemctl", DEFAULT_SYSTEMCTL)?
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Ini).required(true))
            .build()?
            .try_deserialize()?;

        let log_file = raw.monitor.log_file.trim();

        let config = Self {
            url: raw.app.url.trim().to_string(),
            service_name: raw.app.service_name.trim().to_string(),
            log_file: (!log_file.is_empty()).then(|| PathBuf::from(log_file)),
            probe_timeout: Duration::from_secs(raw.monitor.timeout_secs),
            restart_timeout: Duration::from_secs(raw.monitor.restart_timeout_secs),
            systemctl: raw.monitor.systemctl.trim().to_string(),
        };

        config.validate().map_err(WatchdogError::Config)?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.url.is_empty() {
            return Err("app.url cannot be empty".to_string());
        }

        if self.service_name.is_empty() {
            return Err("app.service_name cannot be empty".to_string());
        }

        if self.probe_timeout.is_zero() {
            return Err("monitor.timeout_secs must be greater than 0".to_string());
        }

        if self.restart_timeout.is_zero() {
            return Err("monitor.restart_timeout_secs must be greater than 0".to_string());
        }

        if self.systemctl.is_empty() {
            return Err("monitor.systemctl cannot be empty".to_string());
        }

        Ok(())
    }
}
