//! Hello Watchdog
//!
//! A trivial HTTP service (`hello-app`) and a one-shot availability monitor
//! (`hello-monitor`) that probes it and restarts it through systemd when it
//! cannot be reached.

pub mod config;
pub mod errors;
pub mod logging;
pub mod monitor;
pub mod probe;
pub mod recovery;
pub mod server;

pub use config::MonitorConfig;
pub use errors::{Result, WatchdogError};
pub use logging::{Component, Logging, LoggingGuard};
pub use monitor::{Monitor, RunOutcome};
pub use probe::{CheckResult, Diagnostic, HttpProbe};
pub use recovery::{CommandOutput, RecoveryOutcome, ServiceManager, Systemctl, normalize_unit};
