//! Single-pass check-and-recover routine

use crate::config::MonitorConfig;
use crate::errors::Result;
use crate::probe::{CheckResult, HttpProbe};
use crate::recovery::{RecoveryOutcome, ServiceManager, restart_service};
use tracing::{info, instrument, warn};

/// Result of one monitor run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Target reachable, nothing restarted
    NoActionNeeded(CheckResult),

    /// Target unreachable, restart attempted
    RecoveryAttempted(CheckResult, RecoveryOutcome),
}

impl RunOutcome {
    pub fn check(&self) -> &CheckResult {
        match self {
            RunOutcome::NoActionNeeded(check) => check,
            RunOutcome::RecoveryAttempted(check, _) => check,
        }
    }

    pub fn recovery(&self) -> Option<&RecoveryOutcome> {
        match self {
            RunOutcome::NoActionNeeded(_) => None,
            RunOutcome::RecoveryAttempted(_, recovery) => Some(recovery),
        }
    }
}

/// Probes the configured URL and restarts the service when it is unreachable
pub struct Monitor<M> {
    config: MonitorConfig,
    probe: HttpProbe,
    manager: M,
}

impl<M: ServiceManager> Monitor<M> {
    pub fn new(config: MonitorConfig, manager: M) -> Result<Self> {
        let probe = HttpProbe::new(config.probe_timeout)?;

        Ok(Self {
            config,
            probe,
            manager,
        })
    }

    /// Run one check. A restart is attempted if and only if the probe fails.
    #[instrument(skip(self), fields(url = %self.config.url))]
    pub async fn run_once(&self) -> RunOutcome {
        let check = self.probe.check(&self.config.url).await;

        if check.reachable {
            info!("Restart not required, no action needed");
            return RunOutcome::NoActionNeeded(check);
        }

        warn!("Application unreachable, restarting service");
        let recovery = restart_service(&self.manager, &self.config.service_name).await;

        RunOutcome::RecoveryAttempted(check, recovery)
    }
}
