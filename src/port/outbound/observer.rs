//! Deployment progress port.

use crate::domain::DeployEvent;

/// Receives progress events while a bundle deploys.
///
/// Implementations must not block; events arrive on the deploying task.
pub trait DeployObserver: Send + Sync {
    fn on_event(&self, event: DeployEvent);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DeployObserver for NoopObserver {
    fn on_event(&self, _event: DeployEvent) {}
}
