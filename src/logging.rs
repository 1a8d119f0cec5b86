//! Log setup shared by both binaries
//!
//! Every line carries a local timestamp, the component tag and the
//! severity, e.g. `2026-10-18 09:14:02,117 [MONITOR] INFO: Starting monitor`.
//! Output goes to stdout and, when a log file is configured, is also
//! appended to that file through a non-blocking writer.

use crate::errors::{Result, WatchdogError};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::dispatcher::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{ChronoLocal, FormatTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Which process is writing the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    App,
    Monitor,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::App => write!(f, "APP"),
            Component::Monitor => write!(f, "MONITOR"),
        }
    }
}

/// Event formatter producing `<timestamp> [<COMPONENT>] <LEVEL>: <fields>`
#[derive(Debug, Clone)]
pub struct ComponentFormat {
    component: Component,
    timer: ChronoLocal,
}

impl ComponentFormat {
    pub fn new(component: Component) -> Self {
        Self {
            component,
            timer: ChronoLocal::new(TIMESTAMP_FORMAT.to_string()),
        }
    }
}

impl<S, N> FormatEvent<S, N> for ComponentFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        self.timer.format_time(&mut writer)?;
        write!(
            writer,
            " [{}] {}: ",
            self.component,
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Keeps the installed subscriber alive and flushes the log file on drop.
#[must_use = "dropping the guard uninstalls scoped logging and flushes the log file"]
pub struct LoggingGuard {
    _scope: Option<DefaultGuard>,
    _file: Option<WorkerGuard>,
}

/// Builder for the process logger
#[derive(Debug, Clone)]
pub struct Logging {
    component: Component,
    log_file: Option<PathBuf>,
}

impl Logging {
    pub fn new(component: Component) -> Self {
        Self {
            component,
            log_file: None,
        }
    }

    /// Also append every line to `path`.
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    /// Install for the current thread only. Logging stops when the guard is dropped.
    pub fn set_default(self) -> Result<LoggingGuard> {
        let (subscriber, file_guard) = self.build()?;
        let scope = tracing::subscriber::set_default(subscriber);

        Ok(LoggingGuard {
            _scope: Some(scope),
            _file: file_guard,
        })
    }

    /// Install process-wide, bridging `log` records into `tracing`.
    pub fn try_init(self) -> Result<LoggingGuard> {
        let (subscriber, file_guard) = self.build()?;
        subscriber.try_init().map_err(|e| {
            WatchdogError::Logging(format!("unable to set global logging subscriber: {}", e))
        })?;

        Ok(LoggingGuard {
            _scope: None,
            _file: file_guard,
        })
    }

    fn build(self) -> Result<(impl Subscriber + Send + Sync + 'static, Option<WorkerGuard>)> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .map_err(|e| WatchdogError::Logging(e.to_string()))?;

        let stdout_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(false)
            .event_format(ComponentFormat::new(self.component));

        let (file_layer, file_guard) = match self.log_file {
            Some(path) => {
                let (writer, guard) = tracing_appender::non_blocking(open_appender(&path)?);
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .event_format(ComponentFormat::new(self.component));
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer);

        Ok((subscriber, file_guard))
    }
}

/// Opens `path` for appending, creating it if needed. Never rotates.
fn open_appender(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .ok_or_else(|| {
            WatchdogError::Logging(format!("log file path {} has no file name", path.display()))
        })?
        .to_string_lossy()
        .into_owned();

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(&directory)
        .map_err(|e| {
            WatchdogError::Logging(format!("cannot open log file {}: {}", path.display(), e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{error, info, warn};

    #[test]
    fn test_component_tags() {
        assert_eq!(Component::App.to_string(), "APP");
        assert_eq!(Component::Monitor.to_string(), "MONITOR");
    }

    #[test]
    fn test_scoped_logging_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.log");
        std::fs::write(&path, "previous run\n").unwrap();

        {
            let _guard = Logging::new(Component::Monitor)
                .with_log_file(Some(path.clone()))
                .set_default()
                .unwrap();

            info!("Monitor started");
            warn!("Application unreachable");
            error!(code = 3, "Restart failed");
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines[0], "previous run");
        assert!(lines[1].contains("[MONITOR] INFO: Monitor started"));
        assert!(lines[2].contains("[MONITOR] WARN: Application unreachable"));
        assert!(lines[3].contains("[MONITOR] ERROR: Restart failed code=3"));
    }

    #[test]
    fn test_log_file_without_name_rejected() {
        let result = Logging::new(Component::Monitor)
            .with_log_file(Some(PathBuf::from("/")))
            .set_default();

        assert!(matches!(result, Err(WatchdogError::Logging(_))));
    }
}
