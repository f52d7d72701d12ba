//! Bundle deployment entry point.
//!
//! Fetch manifest → resolve variables → parse → pre-flight → schedule.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::time::timeout;
use tracing::{info, warn};

use super::parser::ManifestParser;
use super::resolver::VariableResolver;
use super::retry::RetryingExecutor;
use super::scheduler::{plan, DependencyScheduler};
use super::waiter::BuildWaiter;
use crate::application::context::DeployContext;
use crate::domain::{AppName, Bundle, DeploymentReport, PlannedService};
use crate::error::{DeployError, Result};
use crate::infrastructure::config::deploy::DeployConfig;
use crate::port::{DeployObserver, ManifestSource, NoopObserver, PlatformApi};

/// What to deploy and under which name.
#[derive(Debug, Clone, Default)]
pub struct DeployRequest {
    /// Manifest name in the repository.
    pub manifest: String,
    /// Instance name, exposed to the manifest as `$$cap_appname`.
    pub instance: String,
    /// Caller-supplied variable values.
    pub variables: BTreeMap<String, String>,
}

/// Resolve and parse a raw manifest for one instance.
pub fn prepare_bundle(
    raw: &str,
    root_domain: &str,
    instance: &AppName,
    variables: &BTreeMap<String, String>,
) -> Result<Bundle> {
    let resolved = VariableResolver::new(root_domain).resolve(raw, instance, variables)?;
    Ok(ManifestParser::parse_resolved(resolved)?)
}

/// Composes resolution, parsing and scheduling into one deployment run.
pub struct BundleOrchestrator {
    platform: Arc<dyn PlatformApi>,
    manifests: Arc<dyn ManifestSource>,
    context: DeployContext,
    settings: DeployConfig,
    observer: Arc<dyn DeployObserver>,
}

impl BundleOrchestrator {
    #[must_use]
    pub fn new(
        platform: Arc<dyn PlatformApi>,
        manifests: Arc<dyn ManifestSource>,
        context: DeployContext,
        settings: DeployConfig,
    ) -> Self {
        Self {
            platform,
            manifests,
            context,
            settings,
            observer: Arc::new(NoopObserver),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DeployObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn context(&self) -> &DeployContext {
        &self.context
    }

    /// Fetch a manifest from the repository.
    pub async fn fetch_manifest(&self, name: &str) -> Result<String> {
        info!(manifest = name, source = %self.manifests.location(), "Fetching manifest");
        self.manifests.fetch(name).await
    }

    /// Fetch, resolve and deploy the manifest named in `request`.
    pub async fn deploy(&self, request: &DeployRequest) -> Result<DeploymentReport> {
        AppName::parse(request.instance.as_str())?;
        let raw = self.fetch_manifest(&request.manifest).await?;
        self.deploy_document(&raw, &request.instance, &request.variables)
            .await
    }

    /// Resolve and deploy an already-fetched manifest document.
    pub async fn deploy_document(
        &self,
        raw: &str,
        instance: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<DeploymentReport> {
        let instance = AppName::parse(instance)?;
        let bundle = prepare_bundle(raw, &self.context.root_domain, &instance, variables)?;
        info!(
            instance = %instance,
            services = bundle.len(),
            platform = %self.context,
            "Bundle resolved"
        );

        self.preflight(&bundle).await?;

        let scheduler = DependencyScheduler::new(
            Arc::clone(&self.platform),
            self.retry(),
            self.waiter(),
        )
        .with_observer(Arc::clone(&self.observer));

        let deployed = match self.settings.timeout() {
            Some(limit) => timeout(limit, scheduler.run(&bundle))
                .await
                .map_err(|_| {
                    warn!(secs = limit.as_secs(), "Deployment deadline reached");
                    DeployError::DeployTimeout {
                        secs: limit.as_secs(),
                    }
                })??,
            None => scheduler.run(&bundle).await?,
        };

        Ok(DeploymentReport {
            instance: instance.to_string(),
            deployed,
            end_instructions: bundle.info.end_instructions.clone(),
        })
    }

    /// Resolve a manifest and compute its rollout order without deploying.
    pub fn plan_document(
        &self,
        raw: &str,
        instance: &str,
        variables: &BTreeMap<String, String>,
    ) -> Result<(Bundle, Vec<PlannedService>)> {
        let instance = AppName::parse(instance)?;
        let bundle = prepare_bundle(raw, &self.context.root_domain, &instance, variables)?;
        let order = plan(&bundle)?;
        Ok((bundle, order))
    }

    /// Refuse to touch anything if a bundle service name is already taken.
    async fn preflight(&self, bundle: &Bundle) -> Result<()> {
        let platform: &dyn PlatformApi = self.platform.as_ref();
        let existing = self
            .retry()
            .run("list apps", move || platform.list_apps())
            .await?;

        let conflicts: Vec<String> = bundle
            .services
            .iter()
            .filter(|service| existing.iter().any(|app| app.name == service.name.as_str()))
            .map(|service| service.name.to_string())
            .collect();

        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(DeployError::NameConflict { names: conflicts }.into())
        }
    }

    fn retry(&self) -> RetryingExecutor {
        RetryingExecutor::new(self.settings.retry_max_attempts, self.settings.retry_delay())
            .with_observer(Arc::clone(&self.observer))
    }

    fn waiter(&self) -> BuildWaiter {
        BuildWaiter::new(
            self.settings.poll_interval(),
            self.settings.build_max_polls,
            self.settings.settle_delay(),
        )
        .with_observer(Arc::clone(&self.observer))
    }
}
