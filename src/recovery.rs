//! Service restart through the process supervisor

use crate::errors::{Result, WatchdogError};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{error, info};

/// Suffix systemd expects on service unit names
pub const UNIT_SUFFIX: &str = ".service";

/// Append [`UNIT_SUFFIX`] unless `service_name` already ends with it.
pub fn normalize_unit(service_name: &str) -> String {
    if service_name.ends_with(UNIT_SUFFIX) {
        service_name.to_string()
    } else {
        format!("{}{}", service_name, UNIT_SUFFIX)
    }
}

/// Exit status and captured output of a supervisor command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` if the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Exit code for log lines, or `signal` when the process was killed.
    pub fn code_label(&self) -> String {
        match self.exit_code {
            Some(code) => code.to_string(),
            None => "signal".to_string(),
        }
    }
}

/// Something able to restart a service unit
#[async_trait]
pub trait ServiceManager: Send + Sync {
    async fn restart(&self, unit: &str) -> Result<CommandOutput>;
}

/// Restarts units with `systemctl restart <unit>`
#[derive(Debug, Clone)]
pub struct Systemctl {
    program: String,
    timeout: Duration,
}

impl Systemctl {
    pub fn new(program: impl Into<String>, restart_timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout: restart_timeout,
        }
    }
}

#[async_trait]
impl ServiceManager for Systemctl {
    async fn restart(&self, unit: &str) -> Result<CommandOutput> {
        let child = Command::new(&self.program)
            .arg("restart")
            .arg(unit)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                WatchdogError::Command(format!("failed to spawn {}: {}", self.program, e))
            })?;

        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                WatchdogError::Timeout(format!(
                    "{} restart {} did not finish within {:?}",
                    self.program, unit, self.timeout
                ))
            })??;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        })
    }
}

/// What happened when a restart was attempted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryOutcome {
    /// The supervisor reported success
    Restarted { unit: String, output: CommandOutput },

    /// The supervisor ran but exited unsuccessfully
    Failed { unit: String, output: CommandOutput },

    /// The supervisor could not be run to completion
    Error { unit: String, message: String },
}

impl RecoveryOutcome {
    pub fn is_restarted(&self) -> bool {
        matches!(self, RecoveryOutcome::Restarted { .. })
    }
}

/// Restart `service_name` and log the result. Failures are reported, not returned.
pub async fn restart_service<M>(manager: &M, service_name: &str) -> RecoveryOutcome
where
    M: ServiceManager + ?Sized,
{
    let unit = normalize_unit(service_name);
    info!("Attempting to restart service {}", unit);

    match manager.restart(&unit).await {
        Ok(output) if output.success() => {
            info!("Service {} restarted successfully", unit);
            RecoveryOutcome::Restarted { unit, output }
        }
        Ok(output) => {
            error!(
                "Failed to restart service {}. code={}, stdout={}, stderr={}",
                unit,
                output.code_label(),
                output.stdout,
                output.stderr
            );
            RecoveryOutcome::Failed { unit, output }
        }
        Err(e) => {
            error!("Error while restarting service {}: {}", unit, e);
            RecoveryOutcome::Error {
                unit,
                message: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::time::Instant;

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_normalize_appends_suffix() {
        assert_eq!(normalize_unit("hello-app"), "hello-app.service");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_unit("hello-app");
        assert_eq!(normalize_unit(&once), once);
        assert_eq!(normalize_unit("hello-app.service"), "hello-app.service");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_systemctl_success_exit() {
        let manager = Systemctl::new("true", Duration::from_secs(5));
        let output = manager.restart("hello-app.service").await.unwrap();

        assert!(output.success());
        assert_eq!(output.exit_code, Some(0));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_systemctl_failure_exit() {
        let manager = Systemctl::new("false", Duration::from_secs(5));
        let outcome = restart_service(&manager, "hello-app").await;

        match outcome {
            RecoveryOutcome::Failed { unit, output } => {
                assert_eq!(unit, "hello-app.service");
                assert_eq!(output.exit_code, Some(1));
            }
            other => panic!("expected failed restart, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_error() {
        let manager = Systemctl::new("/nonexistent/systemctl", Duration::from_secs(5));
        let outcome = restart_service(&manager, "hello-app").await;

        assert!(matches!(outcome, RecoveryOutcome::Error { .. }));
        assert!(!outcome.is_restarted());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hanging_restart_is_killed_after_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(dir.path(), "hang.sh", "exec sleep 30");
        let manager = Systemctl::new(
            script.to_string_lossy().into_owned(),
            Duration::from_millis(300),
        );

        let started = Instant::now();
        let outcome = restart_service(&manager, "hello-app").await;

        assert!(started.elapsed() < Duration::from_secs(5));
        match outcome {
            RecoveryOutcome::Error { unit, message } => {
                assert_eq!(unit, "hello-app.service");
                assert!(message.contains("did not finish within"));
            }
            other => panic!("expected timed out restart, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_restart_captures_output() {
        let dir = tempfile::tempdir().unwrap();
        let script = write_script(
            dir.path(),
            "fail.sh",
            "echo out-text\necho err-text >&2\nexit 4",
        );
        let manager = Systemctl::new(script.to_string_lossy().into_owned(), Duration::from_secs(5));

        let outcome = restart_service(&manager, "hello-app").await;

        assert_eq!(
            outcome,
            RecoveryOutcome::Failed {
                unit: "hello-app.service".to_string(),
                output: CommandOutput {
                    exit_code: Some(4),
                    stdout: "out-text".to_string(),
                    stderr: "err-text".to_string(),
                },
            }
        );
    }

    #[test]
    fn test_code_label() {
        let mut output = CommandOutput {
            exit_code: Some(1),
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(output.code_label(), "1");

        output.exit_code = None;
        assert_eq!(output.code_label(), "signal");
    }
}
