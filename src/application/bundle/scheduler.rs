//! Wave-based dependency scheduling.
//!
//! Pending services are scanned in discovery order, one pass at a time. A
//! service whose dependencies are all deployed is rolled out immediately, so
//! later services in the same pass can already depend on it. A pass that
//! deploys nothing while services remain pending ends the run; this covers
//! cycles and references to unknown services alike.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info};

use super::retry::RetryingExecutor;
use super::waiter::BuildWaiter;
use crate::domain::{
    AppUpdate, BuildOutcome, Bundle, DeployEvent, DeployStep, PlannedService, ServiceSpec,
};
use crate::error::{DeployError, Result};
use crate::port::{DeployObserver, NoopObserver, PlatformApi};

/// Pending/deployed bookkeeping for one run.
struct Rollout<'a> {
    pending: Vec<&'a ServiceSpec>,
    deployed: HashSet<&'a str>,
    cursor: usize,
    pass: usize,
    progressed: bool,
}

impl<'a> Rollout<'a> {
    fn new(bundle: &'a Bundle) -> Self {
        Self {
            pending: bundle.services.iter().collect(),
            deployed: HashSet::with_capacity(bundle.len()),
            cursor: 0,
            pass: 1,
            progressed: false,
        }
    }

    /// Next service whose dependencies are satisfied, or `None` when done.
    ///
    /// The returned service must be confirmed with [`Self::mark_deployed`]
    /// before asking again.
    fn next_ready(&mut self) -> std::result::Result<Option<&'a ServiceSpec>, DeployError> {
        loop {
            if self.pending.is_empty() {
                return Ok(None);
            }

            if self.cursor >= self.pending.len() {
                if !self.progressed {
                    return Err(DeployError::DependencyResolution {
                        pending: self.pending_names(),
                    });
                }
                self.cursor = 0;
                self.pass += 1;
                self.progressed = false;
                continue;
            }

            let candidate = self.pending[self.cursor];
            let ready = candidate
                .depends_on
                .iter()
                .all(|dependency| self.deployed.contains(dependency.as_str()));
            if ready {
                return Ok(Some(candidate));
            }
            self.cursor += 1;
        }
    }

    fn mark_deployed(&mut self) {
        let service = self.pending.remove(self.cursor);
        self.deployed.insert(service.name.as_str());
        self.progressed = true;
    }

    fn pass(&self) -> usize {
        self.pass
    }

    fn pending_names(&self) -> Vec<String> {
        self.pending.iter().map(|s| s.name.to_string()).collect()
    }
}

/// Compute the rollout order without touching the platform.
///
/// Uses exactly the pass semantics of [`DependencyScheduler::run`].
pub fn plan(bundle: &Bundle) -> std::result::Result<Vec<PlannedService>, DeployError> {
    let mut rollout = Rollout::new(bundle);
    let mut planned = Vec::with_capacity(bundle.len());

    while let Some(service) = rollout.next_ready()? {
        planned.push(PlannedService {
            name: service.name.to_string(),
            pass: rollout.pass(),
        });
        rollout.mark_deployed();
    }

    Ok(planned)
}

/// Drives every service of a bundle through create, configure, deploy and
/// await-build, strictly one service at a time.
pub struct DependencyScheduler {
    platform: Arc<dyn PlatformApi>,
    retry: RetryingExecutor,
    waiter: BuildWaiter,
    observer: Arc<dyn DeployObserver>,
}

impl DependencyScheduler {
    #[must_use]
    pub fn new(platform: Arc<dyn PlatformApi>, retry: RetryingExecutor, waiter: BuildWaiter) -> Self {
        Self {
            platform,
            retry,
            waiter,
            observer: Arc::new(NoopObserver),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DeployObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Deploy every service once, dependencies first.
    ///
    /// Returns the service names in completion order. Any failure aborts the
    /// run; services deployed so far are left in place.
    pub async fn run(&self, bundle: &Bundle) -> Result<Vec<String>> {
        let mut rollout = Rollout::new(bundle);
        let mut deployed = Vec::with_capacity(bundle.len());

        loop {
            let service = match rollout.next_ready() {
                Ok(Some(service)) => service,
                Ok(None) => break,
                Err(err) => {
                    error!(pending = ?rollout.pending_names(), "Dependency resolution stalled");
                    return Err(err.into());
                }
            };

            self.deploy_service(service, rollout.pass()).await?;
            rollout.mark_deployed();
            deployed.push(service.name.to_string());
        }

        info!(services = deployed.len(), "Bundle deployed");
        Ok(deployed)
    }

    async fn deploy_service(&self, spec: &ServiceSpec, pass: usize) -> Result<()> {
        let name = spec.name.as_str();
        let platform: &dyn PlatformApi = self.platform.as_ref();

        info!(service = name, pass, "Deploying service");
        self.observer.on_event(DeployEvent::ServiceStarted {
            service: name.to_string(),
            pass,
        });

        let persistent = spec.has_persistent_data();
        self.retry
            .run(&format!("create {name}"), move || {
                platform.register_app(name, persistent)
            })
            .await?;
        self.step_completed(name, DeployStep::Create);

        let update = AppUpdate::for_service(spec);
        let update = &update;
        self.retry
            .run(&format!("configure {name}"), move || platform.update_app(update))
            .await?;
        self.step_completed(name, DeployStep::Configure);

        let source = spec.build_source().ok_or_else(|| {
            DeployError::ManifestParse(format!(
                "service {name} declares neither an image nor dockerfile lines"
            ))
        })?;
        let source = &source;
        self.retry
            .run(&format!("deploy {name}"), move || {
                platform.deploy_app(name, source)
            })
            .await?;
        self.step_completed(name, DeployStep::Deploy);

        match self.waiter.await_build(platform, name).await? {
            BuildOutcome::Ready => {}
            BuildOutcome::Failed => {
                return Err(DeployError::BuildFailed {
                    service: name.to_string(),
                }
                .into())
            }
            BuildOutcome::TimedOut => {
                return Err(DeployError::BuildTimeout {
                    service: name.to_string(),
                    polls: self.waiter.max_polls(),
                }
                .into())
            }
        }
        self.step_completed(name, DeployStep::AwaitBuild);

        info!(service = name, "Service deployed");
        self.observer.on_event(DeployEvent::ServiceDeployed {
            service: name.to_string(),
        });
        Ok(())
    }

    fn step_completed(&self, service: &str, step: DeployStep) {
        self.observer.on_event(DeployEvent::StepCompleted {
            service: service.to_string(),
            step,
        });
    }
}
