//! Bundle deployment timing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry, build-polling and deadline settings for bundle deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeployConfig {
    /// Attempts per remote step, including the first.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,
    /// Fixed delay between attempts in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Delay between build status polls in milliseconds.
    #[serde(default = "default_build_poll_interval_ms")]
    pub build_poll_interval_ms: u64,
    /// Polls before a build counts as timed out.
    #[serde(default = "default_build_max_polls")]
    pub build_max_polls: u32,
    /// Wait before the confirmatory poll in milliseconds.
    #[serde(default = "default_build_settle_ms")]
    pub build_settle_ms: u64,
    /// Optional deadline for a whole bundle deployment in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

const fn default_retry_max_attempts() -> u32 {
    3
}

const fn default_retry_delay_ms() -> u64 {
    2_000
}

const fn default_build_poll_interval_ms() -> u64 {
    2_000
}

const fn default_build_max_polls() -> u32 {
    300
}

const fn default_build_settle_ms() -> u64 {
    3_000
}

impl DeployConfig {
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.build_poll_interval_ms)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.build_settle_ms)
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Settings with no waiting at all, for tests and dry runs.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            retry_delay_ms: 0,
            build_poll_interval_ms: 0,
            build_settle_ms: 0,
            ..Self::default()
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            retry_max_attempts: default_retry_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            build_poll_interval_ms: default_build_poll_interval_ms(),
            build_max_polls: default_build_max_polls(),
            build_settle_ms: default_build_settle_ms(),
            timeout_secs: None,
        }
    }
}
