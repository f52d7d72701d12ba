//! Multi-service bundle deployment.
//!
//! - [`resolver`] - Placeholder expansion (`VariableResolver`)
//! - [`parser`] - Resolved document → [`Bundle`](crate::domain::Bundle)
//! - [`waiter`] - Build-readiness polling (`BuildWaiter`)
//! - [`retry`] - Bounded retry of transient failures (`RetryingExecutor`)
//! - [`scheduler`] - Dependency-ordered rollout (`DependencyScheduler`)
//! - [`orchestrator`] - Entry point composing the above (`BundleOrchestrator`)

pub mod orchestrator;
pub mod parser;
pub mod resolver;
pub mod retry;
pub mod scheduler;
pub mod waiter;

pub use orchestrator::{prepare_bundle, BundleOrchestrator, DeployRequest};
pub use parser::ManifestParser;
pub use resolver::{ResolvedManifest, VariableResolver};
pub use retry::RetryingExecutor;
pub use scheduler::{plan, DependencyScheduler};
pub use waiter::BuildWaiter;
