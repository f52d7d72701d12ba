//! Manifest repository served over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::infrastructure::config::manifest::ManifestConfig;
use crate::port::ManifestSource;

/// Fetches `<base_url>/<name>.<extension>`.
pub struct HttpManifestRepository {
    http: HttpClient,
    base_url: Url,
    extension: String,
}

impl HttpManifestRepository {
    pub fn new(base_url: &str, extension: impl Into<String>) -> Result<Self> {
        Self::with_http(HttpClient::new(), base_url, extension.into())
    }

    pub fn from_config(config: &ManifestConfig, timeout: Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });
        Self::with_http(http, &config.base_url, config.extension.clone())
    }

    fn with_http(http: HttpClient, base_url: &str, extension: String) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))?;
        Ok(Self {
            http,
            base_url,
            extension: extension.trim_start_matches('.').to_string(),
        })
    }

    /// Address of a named manifest.
    pub fn manifest_url(&self, name: &str) -> Result<Url> {
        let name = validate_name(name)?;
        Ok(self.base_url.join(&format!("{name}.{}", self.extension))?)
    }
}

/// Reject names that could escape the repository root.
pub(super) fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !name.starts_with('.');
    if valid {
        Ok(name)
    } else {
        Err(Error::ManifestFetch {
            name: name.to_string(),
            reason: "manifest names may only contain letters, digits, '-', '_' and '.'"
                .to_string(),
        })
    }
}

#[async_trait]
impl ManifestSource for HttpManifestRepository {
    async fn fetch(&self, name: &str) -> Result<String> {
        let url = self.manifest_url(name)?;
        debug!(url = %url, "Fetching manifest");

        let fetch_error = |reason: String| Error::ManifestFetch {
            name: name.to_string(),
            reason,
        };

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| fetch_error(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {status}")));
        }
        response
            .text()
            .await
            .map_err(|err| fetch_error(err.to_string()))
    }

    fn location(&self) -> String {
        self.base_url.to_string()
    }
}
