//! Deployment progress types.

use std::fmt;

/// Per-service step of the rollout sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStep {
    Create,
    Configure,
    Deploy,
    AwaitBuild,
}

impl fmt::Display for DeployStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Configure => write!(f, "configure"),
            Self::Deploy => write!(f, "deploy"),
            Self::AwaitBuild => write!(f, "await-build"),
        }
    }
}

/// Terminal classification of a build wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Ready,
    Failed,
    TimedOut,
}

/// Progress notifications emitted while a bundle deploys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// A service started its four-step sequence.
    ServiceStarted { service: String, pass: usize },
    StepCompleted { service: String, step: DeployStep },
    /// A build poll found the service still building.
    BuildWaiting { service: String, poll: u32 },
    RetryScheduled {
        operation: String,
        attempt: u32,
        max_attempts: u32,
        reason: String,
    },
    ServiceDeployed { service: String },
}

/// A service together with the scheduling pass it was picked in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedService {
    pub name: String,
    pub pass: usize,
}

/// Result of a successful bundle deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentReport {
    pub instance: String,
    /// Service names in the order they completed.
    pub deployed: Vec<String>,
    pub end_instructions: Option<String>,
}
