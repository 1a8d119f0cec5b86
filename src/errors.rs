//! Error types for the watchdog

use std::fmt;

pub type Result<T> = std::result::Result<T, WatchdogError>;

#[derive(Debug)]
pub enum WatchdogError {
    /// IO operation failed
    Io(std::io::Error),

    /// HTTP client could not be built or a request failed
    Http(reqwest::Error),

    /// Configuration file missing, unreadable or invalid
    Config(String),

    /// Logging could not be set up
    Logging(String),

    /// Supervisor command could not be run
    Command(String),

    /// Operation exceeded its deadline
    Timeout(String),
}

impl fmt::Display for WatchdogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchdogError::Io(err) => write!(f, "IO error: {}", err),
            WatchdogError::Http(err) => write!(f, "HTTP error: {}", err),
            WatchdogError::Config(msg) => write!(f, "Configuration error: {}", msg),
            WatchdogError::Logging(msg) => write!(f, "Logging error: {}", msg),
            WatchdogError::Command(msg) => write!(f, "Command error: {}", msg),
            WatchdogError::Timeout(msg) => write!(f, "Timed out: {}", msg),
        }
    }
}

impl std::error::Error for WatchdogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WatchdogError::Io(err) => Some(err),
            WatchdogError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for WatchdogError {
    fn from(err: std::io::Error) -> Self {
        WatchdogError::Io(err)
    }
}

impl From<reqwest::Error> for WatchdogError {
    fn from(err: reqwest::Error) -> Self {
        WatchdogError::Http(err)
    }
}

impl From<config::ConfigError> for WatchdogError {
    fn from(err: config::ConfigError) -> Self {
        WatchdogError::Config(err.to_string())
    }
}
