//! Per-run platform context.

use std::fmt;

use tracing::info;

use crate::error::{Error, Result};
use crate::port::PlatformApi;

/// Platform facts populated once during setup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployContext {
    /// Root domain apps are served under, e.g. `apps.example.com`.
    pub root_domain: String,
    /// Namespace header sent with every control API request.
    pub namespace: String,
    /// Control API base URL.
    pub base_url: String,
}

impl DeployContext {
    /// Query the platform once for its root domain.
    pub async fn discover(
        platform: &dyn PlatformApi,
        namespace: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let info = platform.system_info().await?;
        if info.root_domain.trim().is_empty() {
            return Err(Error::Other(
                "platform has no root domain configured".to_string(),
            ));
        }

        info!(root_domain = %info.root_domain, "Platform context loaded");
        Ok(Self {
            root_domain: info.root_domain,
            namespace: namespace.into(),
            base_url: base_url.into(),
        })
    }
}

/// Renders as `<base_url> [<namespace>]`.
impl fmt::Display for DeployContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.base_url, self.namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::platform::FakePlatform;

    #[tokio::test]
    async fn discover_reads_root_domain() {
        let platform = FakePlatform::new().with_root_domain("apps.example.com");

        let context = DeployContext::discover(&platform, "captain", "https://captain.example.com")
            .await
            .unwrap();

        assert_eq!(context.root_domain, "apps.example.com");
        assert_eq!(context.to_string(), "https://captain.example.com [captain]");
    }

    #[tokio::test]
    async fn discover_rejects_missing_root_domain() {
        let platform = FakePlatform::new().with_root_domain("");

        let result = DeployContext::discover(&platform, "captain", "http://localhost").await;

        assert!(matches!(result, Err(Error::Other(_))));
    }
}
