//! Deployment progress printed through the output helpers.

use crate::adapter::inbound::cli::output;
use crate::domain::DeployEvent;
use crate::port::DeployObserver;

/// Build polls between "still building" notes.
const BUILD_NOTE_EVERY: u32 = 10;

/// Prints one line per meaningful [`DeployEvent`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleObserver;

impl DeployObserver for ConsoleObserver {
    fn on_event(&self, event: DeployEvent) {
        match event {
            DeployEvent::ServiceStarted { service, pass } => {
                output::service_started(&service, pass);
            }
            DeployEvent::StepCompleted { service, step } => {
                output::step_completed(&service, step);
            }
            DeployEvent::BuildWaiting { service, poll } => {
                if poll % BUILD_NOTE_EVERY == 0 {
                    output::still_building(&service, poll);
                }
            }
            DeployEvent::RetryScheduled {
                operation,
                attempt,
                max_attempts,
                reason,
            } => {
                output::retry_scheduled(&operation, attempt, max_attempts, &reason);
            }
            DeployEvent::ServiceDeployed { service } => {
                output::service_deployed(&service);
            }
        }
    }
}
