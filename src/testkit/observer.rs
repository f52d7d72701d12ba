//! [`DeployObserver`] that records every event.

use std::sync::Mutex;

use crate::domain::DeployEvent;
use crate::port::DeployObserver;

#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<DeployEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DeployEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Number of `RetryScheduled` events seen.
    pub fn retries(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, DeployEvent::RetryScheduled { .. }))
            .count()
    }
}

impl DeployObserver for RecordingObserver {
    fn on_event(&self, event: DeployEvent) {
        self.events.lock().unwrap().push(event);
    }
}
