//! Build-readiness polling for a single service.
//!
//! ```text
//!   Building ──(is_build_failed)──────────► Failed
//!      │  ▲
//!      │  └──(is_building, polls left)
//!      ├──(!is_building)──► Ready ──settle + confirm──► Ready | Failed
//!      └──(poll cap reached)──────────────► TimedOut
//! ```
//!
//! Polls are never retried: a poll error propagates to the caller.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::domain::{BuildOutcome, DeployEvent};
use crate::error::Result;
use crate::port::{DeployObserver, NoopObserver, PlatformApi};

/// Polls a service's build flags until the build settles or the cap is hit.
pub struct BuildWaiter {
    poll_interval: Duration,
    max_polls: u32,
    settle_delay: Duration,
    observer: Arc<dyn DeployObserver>,
}

impl BuildWaiter {
    #[must_use]
    pub fn new(poll_interval: Duration, max_polls: u32, settle_delay: Duration) -> Self {
        Self {
            poll_interval,
            max_polls: max_polls.max(1),
            settle_delay,
            observer: Arc::new(NoopObserver),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DeployObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn max_polls(&self) -> u32 {
        self.max_polls
    }

    /// Poll until the service stops building, fails, or the poll cap is hit.
    pub async fn poll_until_settled(
        &self,
        platform: &dyn PlatformApi,
        service: &str,
    ) -> Result<BuildOutcome> {
        for poll in 1..=self.max_polls {
            let info = platform.runtime_info(service).await?;

            if info.is_build_failed {
                warn!(service, poll, "Build failed");
                return Ok(BuildOutcome::Failed);
            }
            if !info.is_building {
                debug!(service, poll, "Build finished");
                return Ok(BuildOutcome::Ready);
            }

            self.observer.on_event(DeployEvent::BuildWaiting {
                service: service.to_string(),
                poll,
            });
            if poll < self.max_polls {
                sleep(self.poll_interval).await;
            }
        }

        warn!(service, polls = self.max_polls, "Build did not finish in time");
        Ok(BuildOutcome::TimedOut)
    }

    /// Wait for a build and confirm a `Ready` result with one more poll.
    ///
    /// The failure flag can lag the building flag, so `Ready` only stands if
    /// a second poll after the settle delay still reports no failure.
    pub async fn await_build(
        &self,
        platform: &dyn PlatformApi,
        service: &str,
    ) -> Result<BuildOutcome> {
        let outcome = self.poll_until_settled(platform, service).await?;
        if outcome != BuildOutcome::Ready {
            return Ok(outcome);
        }

        if !self.settle_delay.is_zero() {
            sleep(self.settle_delay).await;
        }
        let confirm = platform.runtime_info(service).await?;
        if confirm.is_build_failed {
            warn!(service, "Build reported failure after finishing");
            return Ok(BuildOutcome::Failed);
        }

        info!(service, "Build ready");
        Ok(BuildOutcome::Ready)
    }
}
