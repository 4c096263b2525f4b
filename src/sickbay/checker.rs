//! HTTP availability check
//!
//! One GET per check, no retries. Anything short of a 200 is DOWN.

use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use ureq::Agent;

/// Timeout for the scheduled check
pub const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    /// Target answered 200
    Up,
    /// Target answered with another status, or not at all (`code` is `None`)
    Down { code: Option<u16> },
}

impl CheckResult {
    pub fn is_up(&self) -> bool {
        matches!(self, CheckResult::Up)
    }

    /// HTTP status of a failed check, if a response was received
    pub fn error_code(&self) -> Option<u16> {
        match self {
            CheckResult::Up => None,
            CheckResult::Down { code } => *code,
        }
    }

    /// Error code as shown in alerts
    pub fn error_code_display(&self) -> String {
        match self.error_code() {
            Some(code) => code.to_string(),
            None => "Unknown Error".to_string(),
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckResult::Up => write!(f, "up"),
            CheckResult::Down { .. } => write!(f, "down ({})", self.error_code_display()),
        }
    }
}

impl Serialize for CheckResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("CheckResult", 2)?;
        state.serialize_field("up", &self.is_up())?;
        state.serialize_field("error_code", &self.error_code())?;
        state.end()
    }
}

/// Anything that can tell whether a URL is up
pub trait Probe {
    fn check(&self, url: &str) -> CheckResult;
}

/// Probe backed by a blocking HTTP client
pub struct HttpProbe {
    agent: Agent,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new(CHECK_TIMEOUT)
    }
}

impl Probe for HttpProbe {
    fn check(&self, url: &str) -> CheckResult {
        let start = Instant::now();
        match self.agent.get(url).call() {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!(url, status, elapsed_ms = start.elapsed().as_millis() as u64, "check answered");
                if status == 200 {
                    CheckResult::Up
                } else {
                    CheckResult::Down { code: Some(status) }
                }
            }
            Err(e) => {
                warn!(url, error = %e, elapsed_ms = start.elapsed().as_millis() as u64, "check got no response");
                CheckResult::Down { code: None }
            }
        }
    }
}

/// Issue one GET against `url` and classify the response
///
/// Transport failures (refused, DNS, TLS, timeout) come back as DOWN without a
/// code rather than as errors.
pub fn check(url: &str, timeout: Duration) -> CheckResult {
    HttpProbe::new(timeout).check(url)
}

#[cfg(test)]
impl HttpProbe {
    /// Probe that ignores proxy settings from the environment
    fn direct(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .proxy(None)
            .build()
            .into();
        Self { agent }
    }
}
