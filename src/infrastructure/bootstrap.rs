//! Composition root: wires configuration into adapters and services.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::adapter::outbound::manifest::{DirectoryManifestRepository, HttpManifestRepository};
use crate::adapter::outbound::platform::PlatformClient;
use crate::application::{AppService, BundleOrchestrator, DeployContext};
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::{DeployObserver, ManifestSource, PlatformApi};

/// An authenticated control API client plus the context discovered from it.
pub struct Platform {
    pub api: Arc<dyn PlatformApi>,
    pub context: DeployContext,
}

/// Build a client and authenticate it with the token or password from the
/// environment.
pub async fn connect(config: &Config) -> Result<PlatformClient> {
    let url = config.require_platform_url()?;
    let mut client = PlatformClient::from_config(&config.platform)?;

    if client.is_authenticated() {
        debug!(url, "Using token from environment");
    } else if let Some(password) = &config.platform.password {
        client.login(password).await?;
    } else {
        return Err(ConfigError::MissingField {
            field: "RIGGER_TOKEN or RIGGER_PASSWORD",
        }
        .into());
    }
    Ok(client)
}

/// Connect and read the platform context once.
pub async fn platform(config: &Config) -> Result<Platform> {
    let client = connect(config).await?;
    let context = DeployContext::discover(
        &client,
        config.platform.namespace.clone(),
        client.base_url().to_string(),
    )
    .await?;
    Ok(Platform {
        api: Arc::new(client),
        context,
    })
}

/// Manifest repository selected by `[manifests]`.
pub fn manifest_source(config: &Config) -> Result<Arc<dyn ManifestSource>> {
    let manifests = &config.manifests;
    let source: Arc<dyn ManifestSource> = match &manifests.directory {
        Some(directory) => Arc::new(DirectoryManifestRepository::new(
            directory,
            manifests.extension.clone(),
        )),
        None => Arc::new(HttpManifestRepository::from_config(
            manifests,
            Duration::from_millis(config.platform.timeout_ms),
        )?),
    };
    info!(source = %source.location(), "Manifest repository ready");
    Ok(source)
}

#[must_use]
pub fn orchestrator(
    config: &Config,
    platform: &Platform,
    manifests: Arc<dyn ManifestSource>,
    observer: Arc<dyn DeployObserver>,
) -> BundleOrchestrator {
    BundleOrchestrator::new(
        Arc::clone(&platform.api),
        manifests,
        platform.context.clone(),
        config.deploy.clone(),
    )
    .with_observer(observer)
}

#[must_use]
pub fn app_service(platform: &Platform) -> AppService {
    AppService::new(Arc::clone(&platform.api))
}
