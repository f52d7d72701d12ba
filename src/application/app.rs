//! Single-app operations against the control API.

use std::sync::Arc;

use tracing::info;

use crate::domain::{AppDefinition, AppName, BackupToken};
use crate::error::{DeployError, Result};
use crate::port::PlatformApi;

/// Thin use-case layer over [`PlatformApi`] for one app at a time.
///
/// Names are validated before any request is sent.
pub struct AppService {
    platform: Arc<dyn PlatformApi>,
}

impl AppService {
    #[must_use]
    pub fn new(platform: Arc<dyn PlatformApi>) -> Self {
        Self { platform }
    }

    /// All apps, sorted by name.
    pub async fn list_apps(&self) -> Result<Vec<AppDefinition>> {
        let mut apps = self.platform.list_apps().await?;
        apps.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(apps)
    }

    pub async fn get_app(&self, name: &str) -> Result<AppDefinition> {
        let name = AppName::parse(name)?;
        self.platform
            .list_apps()
            .await?
            .into_iter()
            .find(|app| app.name == name.as_str())
            .ok_or_else(|| DeployError::AppNotFound(name.to_string()).into())
    }

    /// Register an empty app.
    pub async fn create_app(&self, name: &str, has_persistent_data: bool) -> Result<()> {
        let name = AppName::parse(name)?;
        self.platform
            .register_app(name.as_str(), has_persistent_data)
            .await?;
        info!(app = %name, persistent = has_persistent_data, "App registered");
        Ok(())
    }

    /// Remove an app. Listed named volumes are removed with it.
    pub async fn delete_app(&self, name: &str, volumes: &[String]) -> Result<()> {
        let app = self.get_app(name).await?;
        self.platform.delete_app(&app.name, volumes).await?;
        info!(app = %app.name, volumes = volumes.len(), "App deleted");
        Ok(())
    }

    pub async fn add_domain(&self, name: &str, domain: &str) -> Result<()> {
        let name = AppName::parse(name)?;
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(crate::error::Error::Other(
                "domain must not be empty".to_string(),
            ));
        }
        self.platform.add_custom_domain(name.as_str(), domain).await?;
        info!(app = %name, domain, "Custom domain attached");
        Ok(())
    }

    /// Request a certificate for a domain already attached to the app.
    pub async fn enable_tls(&self, name: &str, domain: &str) -> Result<()> {
        let name = AppName::parse(name)?;
        self.platform
            .enable_custom_domain_tls(name.as_str(), domain.trim())
            .await?;
        info!(app = %name, domain, "TLS enabled");
        Ok(())
    }

    pub async fn create_backup(&self) -> Result<BackupToken> {
        let token = self.platform.create_backup().await?;
        info!("Backup prepared");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testkit::platform::{FakePlatform, PlatformCall};

    fn service(platform: &Arc<FakePlatform>) -> AppService {
        AppService::new(Arc::clone(platform) as Arc<dyn PlatformApi>)
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let platform = Arc::new(FakePlatform::new().with_existing_apps(&["web", "api", "db"]));

        let names: Vec<String> = service(&platform)
            .list_apps()
            .await
            .unwrap()
            .into_iter()
            .map(|app| app.name)
            .collect();

        assert_eq!(names, vec!["api", "db", "web"]);
    }

    #[tokio::test]
    async fn get_unknown_app_is_not_found() {
        let platform = Arc::new(FakePlatform::new().with_existing_apps(&["web"]));

        let result = service(&platform).get_app("api").await;

        assert!(matches!(
            result,
            Err(Error::Deploy(DeployError::AppNotFound(ref name))) if name == "api"
        ));
    }

    #[tokio::test]
    async fn invalid_name_sends_nothing() {
        let platform = Arc::new(FakePlatform::new());

        let result = service(&platform).create_app("Bad_Name", false).await;

        assert!(matches!(
            result,
            Err(Error::Deploy(DeployError::InvalidAppName { .. }))
        ));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn create_then_get_round_trips_through_platform() {
        let platform = Arc::new(FakePlatform::new());
        let apps = service(&platform);

        apps.create_app("notes", true).await.unwrap();
        let app = apps.get_app("notes").await.unwrap();

        assert_eq!(app.name, "notes");
        assert!(app.has_persistent_data);
    }

    #[tokio::test]
    async fn delete_passes_volumes_through() {
        let platform = Arc::new(FakePlatform::new().with_existing_apps(&["db"]));

        service(&platform)
            .delete_app("db", &["db-data".to_string()])
            .await
            .unwrap();

        assert!(platform.calls().contains(&PlatformCall::Delete {
            name: "db".into(),
            volumes: vec!["db-data".into()],
        }));
    }

    #[tokio::test]
    async fn empty_domain_is_rejected() {
        let platform = Arc::new(FakePlatform::new());

        let result = service(&platform).add_domain("web", "  ").await;

        assert!(matches!(result, Err(Error::Other(_))));
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn domain_and_tls_are_forwarded() {
        let platform = Arc::new(FakePlatform::new());
        let apps = service(&platform);

        apps.add_domain("web", "blog.example.com").await.unwrap();
        apps.enable_tls("web", "blog.example.com").await.unwrap();

        assert_eq!(
            platform.calls(),
            vec![
                PlatformCall::AddDomain {
                    name: "web".into(),
                    domain: "blog.example.com".into(),
                },
                PlatformCall::EnableTls {
                    name: "web".into(),
                    domain: "blog.example.com".into(),
                },
            ]
        );
    }
}
