//! Control API port.
//!
//! Every method is a single remote request. Implementations map transport
//! failures to [`RemoteError`](crate::error::RemoteError) so callers can tell
//! retryable failures from the platform's own rejections.

use async_trait::async_trait;

use crate::domain::{
    AppDefinition, AppUpdate, BackupToken, BuildSource, ServiceRuntimeInfo, SystemInfo,
};
use crate::error::Result;

/// Operations of the application platform consumed by this crate.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Fetch platform facts such as the root domain.
    async fn system_info(&self) -> Result<SystemInfo>;

    async fn list_apps(&self) -> Result<Vec<AppDefinition>>;

    /// Register a new, empty app.
    async fn register_app(&self, name: &str, has_persistent_data: bool) -> Result<()>;

    async fn update_app(&self, update: &AppUpdate) -> Result<()>;

    /// Push a build definition, starting a build.
    async fn deploy_app(&self, name: &str, source: &BuildSource) -> Result<()>;

    /// Current build flags of an app.
    async fn runtime_info(&self, name: &str) -> Result<ServiceRuntimeInfo>;

    /// Remove an app together with the listed named volumes.
    async fn delete_app(&self, name: &str, volumes: &[String]) -> Result<()>;

    async fn add_custom_domain(&self, name: &str, domain: &str) -> Result<()>;

    async fn enable_custom_domain_tls(&self, name: &str, domain: &str) -> Result<()>;

    /// Ask the platform to prepare a backup archive.
    async fn create_backup(&self) -> Result<BackupToken>;
}
