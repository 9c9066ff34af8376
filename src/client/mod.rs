//! Public client facades.
//!
//! [`Client`] blocks the calling thread; [`AsyncClient`] is awaited. Both are
//! built from the same [`ClientOptions`], resolve credentials once at
//! construction, and share request building and decoding, so the same
//! response always yields the same [`ScanResult`](crate::ScanResult).

mod asynchronous;
mod blocking;

pub use asynchronous::AsyncClient;
pub use blocking::Client;

use crate::config::Config;
use crate::credentials::Credentials;
use crate::endpoint::DEFAULT_BASE_URL;
use crate::error::{Error, Result};
use crate::transport::DEFAULT_TIMEOUT;
use std::time::{Duration, Instant};

/// Settings used to build a client.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use urlscan::ClientOptions;
///
/// let options = ClientOptions::new()
///     .api_key("my-key")
///     .account_id("my-account")
///     .timeout(Duration::from_secs(30));
///
/// assert_eq!(options.timeout, Duration::from_secs(30));
/// ```
#[derive(Clone)]
pub struct ClientOptions {
    /// Falls back to `CLOUDFLARE_API_KEY` when unset or empty.
    pub api_key: Option<String>,
    /// Falls back to `CLOUDFLARE_ACCOUNT_ID` when unset or empty.
    pub account_id: Option<String>,
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            account_id: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("account_id", &self.account_id)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options taking the base URL and timeout from a loaded config file.
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            ..Self::default()
        }
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn resolve_credentials(&self) -> Result<Credentials> {
        Credentials::resolve(self.api_key.as_deref(), self.account_id.as_deref())
    }
}

/// Shortest pause between status requests, whatever the configured interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Budget for waiting on a scan to leave the pending state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Total time allowed across all attempts.
    pub timeout: Duration,
    /// Pause between status requests. Raised to [`MIN_POLL_INTERVAL`] if
    /// shorter.
    pub interval: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            interval: Duration::from_secs(5),
        }
    }
}

impl WaitOptions {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: Duration::from_secs(config.poll_timeout_secs),
            interval: Duration::from_secs(config.poll_interval_secs),
        }
    }
}

/// Tracks attempts and the deadline for one wait.
pub(crate) struct PollBudget<'a> {
    uuid: &'a str,
    options: WaitOptions,
    started: Instant,
    attempts: u32,
}

impl<'a> PollBudget<'a> {
    pub(crate) fn start(uuid: &'a str, options: WaitOptions) -> Self {
        Self {
            uuid,
            options,
            started: Instant::now(),
            attempts: 0,
        }
    }

    pub(crate) fn record_attempt(&mut self) {
        self.attempts += 1;
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }

    /// How long to sleep before the next attempt: the interval, at least
    /// [`MIN_POLL_INTERVAL`], clamped to what is left of the budget.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] once the budget is spent.
    pub(crate) fn next_delay(&self) -> Result<Duration> {
        let elapsed = self.started.elapsed();
        match self.options.timeout.checked_sub(elapsed) {
            Some(remaining) if !remaining.is_zero() => {
                Ok(self.options.interval.max(MIN_POLL_INTERVAL).min(remaining))
            }
            _ => Err(Error::Timeout {
                uuid: self.uuid.to_string(),
                elapsed,
                attempts: self.attempts,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_zero_budget_times_out_immediately() {
        let mut budget = PollBudget::start("u", WaitOptions::new(Duration::ZERO, Duration::from_secs(1)));
        budget.record_attempt();
        let err = budget.next_delay().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.to_string().contains("1 attempts"));
    }

    #[test]
    fn test_delay_is_clamped_to_remaining_budget() {
        let budget = PollBudget::start(
            "u",
            WaitOptions::new(Duration::from_secs(2), Duration::from_secs(60)),
        );
        let delay = budget.next_delay().unwrap();
        assert!(delay <= Duration::from_secs(2));
    }

    #[test]
    fn test_delay_is_interval_when_budget_is_large() {
        let budget = PollBudget::start(
            "u",
            WaitOptions::new(Duration::from_secs(600), Duration::from_millis(200)),
        );
        assert_eq!(budget.next_delay().unwrap(), Duration::from_millis(200));
    }

    #[test]
    fn test_zero_interval_still_pauses() {
        let budget = PollBudget::start(
            "u",
            WaitOptions::new(Duration::from_secs(600), Duration::ZERO),
        );
        assert_eq!(budget.next_delay().unwrap(), MIN_POLL_INTERVAL);
    }

    #[test]
    fn test_options_debug_redacts_key() {
        let options = ClientOptions::new().api_key("secret").account_id("acc");
        let debug = format!("{:?}", options);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("acc"));
    }

    #[test]
    fn test_options_from_config() {
        let config = Config {
            base_url: "http://localhost:9000".to_string(),
            timeout_secs: 5,
            ..Config::default()
        };
        let options = ClientOptions::from_config(&config);
        assert_eq!(options.base_url, "http://localhost:9000");
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert!(options.api_key.is_none());
    }
}
