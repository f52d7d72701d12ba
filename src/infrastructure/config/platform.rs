//! Control API connection settings.

use serde::{Deserialize, Serialize};

/// Environment variable holding a ready-made auth token.
pub const TOKEN_ENV: &str = "RIGGER_TOKEN";
/// Environment variable holding the platform password, exchanged for a token.
pub const PASSWORD_ENV: &str = "RIGGER_PASSWORD";
/// Environment variable overriding `platform.url`.
pub const URL_ENV: &str = "RIGGER_URL";

/// Control API connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatformConfig {
    /// Base URL of the control API, e.g. `https://captain.example.com`.
    #[serde(default)]
    pub url: String,
    /// Value of the `x-namespace` header.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Auth token, only ever read from the environment.
    #[serde(skip)]
    pub token: Option<String>,
    /// Password, only ever read from the environment.
    #[serde(skip)]
    pub password: Option<String>,
}

fn default_namespace() -> String {
    "captain".to_string()
}

const fn default_timeout_ms() -> u64 {
    30_000
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

impl PlatformConfig {
    /// Pull credentials and URL overrides from the environment.
    pub fn apply_env(&mut self) {
        if let Some(url) = non_empty_env(URL_ENV) {
            self.url = url;
        }
        self.token = non_empty_env(TOKEN_ENV);
        self.password = non_empty_env(PASSWORD_ENV);
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            namespace: default_namespace(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            token: None,
            password: None,
        }
    }
}
