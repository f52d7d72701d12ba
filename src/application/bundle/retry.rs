//! Bounded retry around a single remote operation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::DeployEvent;
use crate::error::{Error, Result};
use crate::port::{DeployObserver, NoopObserver};

/// Retries an operation on transient transport failures.
///
/// Non-transient errors and the error of the final attempt are returned
/// unchanged.
pub struct RetryingExecutor {
    max_attempts: u32,
    delay: Duration,
    observer: Arc<dyn DeployObserver>,
}

impl RetryingExecutor {
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            observer: Arc::new(NoopObserver),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DeployObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op`, calling it again after a fixed delay while it fails transiently.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "Operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => {
                    if attempt >= self.max_attempts || !err.is_transient() {
                        return Err(err);
                    }
                    self.backoff(operation, attempt, &err).await;
                }
            }
        }
    }

    async fn backoff(&self, operation: &str, attempt: u32, err: &Error) {
        warn!(
            operation,
            attempt,
            max_attempts = self.max_attempts,
            error = %err,
            "Remote operation failed, retrying"
        );
        self.observer.on_event(DeployEvent::RetryScheduled {
            operation: operation.to_string(),
            attempt,
            max_attempts: self.max_attempts,
            reason: err.to_string(),
        });
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}
