//! Process-level configuration.

use std::time::Duration;

/// Environment variable overriding the base reconnect delay, in seconds.
pub const RETRY_TIMEOUT_ENV: &str = "AGENCY_RETRY_TIMEOUT_SECS";

const DEFAULT_RETRY_TIMEOUT_SECS: u64 = 5;

/// Client configuration, read once at startup.
#[derive(Debug, Clone, Copy)]
pub struct ClientConfig {
    /// Base unit of the linear reconnect backoff.
    pub base_retry_timeout: Duration,
}

impl ClientConfig {
    /// Read configuration from the environment, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let raw = std::env::var(RETRY_TIMEOUT_ENV).ok();
        Self {
            base_retry_timeout: parse_timeout(raw.as_deref()),
        }
    }

    /// Configuration with an explicit base retry timeout.
    #[must_use]
    pub const fn with_base_retry_timeout(base_retry_timeout: Duration) -> Self {
        Self { base_retry_timeout }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_retry_timeout: Duration::from_secs(DEFAULT_RETRY_TIMEOUT_SECS),
        }
    }
}

fn parse_timeout(raw: Option<&str>) -> Duration {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .map_or_else(
            || Duration::from_secs(DEFAULT_RETRY_TIMEOUT_SECS),
            Duration::from_secs,
        )
}
