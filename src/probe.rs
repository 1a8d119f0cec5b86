//! HTTP reachability probe
//!
//! Every failure mode of a request (bad status, transport error, timeout,
//! anything else) is folded into a [`CheckResult`] so callers only ever
//! branch on `reachable`.

use crate::errors::{Result, WatchdogError};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Why a probe came out the way it did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The target answered with this HTTP status
    Status(u16),

    /// No answer within the probe timeout
    Timeout,

    /// Connection refused, DNS failure or another transport error
    Network(String),

    /// Anything else, with full detail
    Unexpected(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Status(code) => write!(f, "HTTP {}", code),
            Diagnostic::Timeout => write!(f, "timed out"),
            Diagnostic::Network(detail) => write!(f, "network error: {}", detail),
            Diagnostic::Unexpected(detail) => write!(f, "unexpected error: {}", detail),
        }
    }
}

/// Outcome of a single reachability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub reachable: bool,
    pub diagnostic: Option<Diagnostic>,
}

impl CheckResult {
    pub fn reachable(status: u16) -> Self {
        Self {
            reachable: true,
            diagnostic: Some(Diagnostic::Status(status)),
        }
    }

    pub fn unreachable(diagnostic: Diagnostic) -> Self {
        Self {
            reachable: false,
            diagnostic: Some(diagnostic),
        }
    }
}

/// Issues bounded GET requests against the probe target
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(probe_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(probe_timeout)
            .user_agent(format!("hello-monitor/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(WatchdogError::Http)?;

        Ok(Self {
            client,
            timeout: probe_timeout,
        })
    }

    /// Perform one GET against `url`. Never fails; errors become diagnostics.
    pub async fn check(&self, url: &str) -> CheckResult {
        debug!("Probing {} (timeout {:?})", url, self.timeout);

        let response = match timeout(self.timeout, self.client.get(url).send()).await {
            Ok(response) => response,
            Err(_) => {
                error!("Application did not respond within {:?}", self.timeout);
                return CheckResult::unreachable(Diagnostic::Timeout);
            }
        };

        match response {
            Ok(response) if response.status() == StatusCode::OK => {
                info!("Application is reachable (HTTP {})", response.status().as_u16());
                CheckResult::reachable(response.status().as_u16())
            }
            Ok(response) => {
                let status = response.status().as_u16();
                error!("Application returned unexpected HTTP status {}", status);
                CheckResult::unreachable(Diagnostic::Status(status))
            }
            Err(e) => classify_error(e),
        }
    }
}

fn classify_error(err: reqwest::Error) -> CheckResult {
    if err.is_timeout() {
        error!("Application did not respond in time: {}", err);
        return CheckResult::unreachable(Diagnostic::Timeout);
    }

    if err.is_connect() || err.is_request() {
        let detail = error_chain(&err);
        error!("Network error while reaching application: {}", detail);
        return CheckResult::unreachable(Diagnostic::Network(detail));
    }

    let detail = format!("{:?}", err);
    error!("Unexpected error while checking application: {}", detail);
    CheckResult::unreachable(Diagnostic::Unexpected(detail))
}

/// Flattens an error and its sources into one line.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_ok_status_is_reachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Hello World!"))
            .expect(1)
            .mount(&server)
            .await;

        let probe = HttpProbe::new(Duration::from_secs(5)).unwrap();
        let result = probe.check(&format!("{}/", server.uri())).await;

        assert_eq!(result, CheckResult::reachable(200));
    }

    #[tokio::test]
    async fn test_other_success_status_is_not_reachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let probe = HttpProbe::new(Duration::from_secs(5)).unwrap();
        let result = probe.check(&server.uri()).await;

        assert!(!result.reachable);
        assert_eq!(result.diagnostic, Some(Diagnostic::Status(204)));
    }

    #[tokio::test]
    async fn test_slow_target_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let probe = HttpProbe::new(Duration::from_millis(200)).unwrap();
        let result = probe.check(&server.uri()).await;

        assert!(!result.reachable);
        assert_eq!(result.diagnostic, Some(Diagnostic::Timeout));
    }

    #[tokio::test]
    async fn test_malformed_url_is_unexpected() {
        let probe = HttpProbe::new(Duration::from_secs(1)).unwrap();
        let result = probe.check("not a url").await;

        assert!(!result.reachable);
        assert!(matches!(result.diagnostic, Some(Diagnostic::Unexpected(_))));
    }

    #[test]
    fn test_diagnostic_display() {
        assert_eq!(Diagnostic::Status(503).to_string(), "HTTP 503");
        assert_eq!(Diagnostic::Timeout.to_string(), "timed out");
    }
}
