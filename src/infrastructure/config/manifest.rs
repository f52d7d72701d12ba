//! Manifest repository settings.

use serde::{Deserialize, Serialize};

/// Where manifests are fetched from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ManifestConfig {
    /// Base URL of the HTTP manifest repository.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// File extension appended to manifest names.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Local directory to read manifests from instead of `base_url`.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_base_url() -> String {
    "https://oneclickapps.caprover.com/v4/apps".to_string()
}

fn default_extension() -> String {
    "yml".to_string()
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            extension: default_extension(),
            directory: None,
        }
    }
}
