//! Platform-side app types shared by the control API port and its callers.

use serde::Serialize;

use super::manifest::{ServiceSpec, VolumeMount};

/// Instance count pushed when configuring a bundle service.
pub const BUNDLE_INSTANCE_COUNT: u32 = 1;

/// Platform facts fetched once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub root_domain: String,
}

/// An app as listed by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppDefinition {
    pub name: String,
    pub instance_count: u32,
    pub has_persistent_data: bool,
    pub not_expose_as_web_app: bool,
    pub container_http_port: u16,
    pub custom_domains: Vec<String>,
}

/// Build flags of a service, valid for a single poll only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceRuntimeInfo {
    pub is_building: bool,
    pub is_build_failed: bool,
}

/// Environment variable entry in the order it is pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

/// Configuration pushed to an app after registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppUpdate {
    pub app_name: String,
    pub instance_count: u32,
    pub env_vars: Vec<EnvVar>,
    pub volumes: Vec<VolumeMount>,
    pub not_expose_as_web_app: bool,
    pub container_http_port: u16,
    pub websocket_support: bool,
}

impl AppUpdate {
    /// Build the configure step for a bundle service.
    #[must_use]
    pub fn for_service(spec: &ServiceSpec) -> Self {
        Self {
            app_name: spec.name.to_string(),
            instance_count: BUNDLE_INSTANCE_COUNT,
            env_vars: spec
                .environment
                .iter()
                .map(|(key, value)| EnvVar {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
            volumes: spec.volumes.clone(),
            not_expose_as_web_app: spec.extras.not_expose_as_web_app,
            container_http_port: spec.extras.container_http_port,
            websocket_support: spec.extras.websocket_support,
        }
    }
}

/// Token identifying a backup archive prepared by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupToken(pub String);
