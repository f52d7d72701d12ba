//! Typed bundle model produced from a resolved manifest document.
//!
//! A [`Bundle`] is owned by a single orchestration run and is never mutated
//! after parsing.

use std::fmt;

use super::id::AppName;

/// Placeholder the manifest author expects the caller to supply or default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestVariable {
    /// Placeholder token, e.g. `$$cap_db_pass`.
    pub id: String,
    pub label: String,
    pub default_value: Option<String>,
    pub description: Option<String>,
    /// Validation pattern in `/pattern/flags` form.
    pub valid_regex: Option<String>,
}

/// Where a container path is mounted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeMount {
    /// Bind mount of a path on the host.
    Host {
        host_path: String,
        container_path: String,
    },
    /// Platform-managed named volume.
    Named {
        volume_name: String,
        container_path: String,
    },
}

impl VolumeMount {
    /// Split a `source:containerPath` entry.
    ///
    /// A source beginning with `/` is a host path; anything else names a
    /// volume. Returns `None` when either side is missing.
    #[must_use]
    pub fn parse(entry: &str) -> Option<Self> {
        let (source, container_path) = entry.split_once(':')?;
        let source = source.trim();
        let container_path = container_path.trim();
        if source.is_empty() || container_path.is_empty() {
            return None;
        }

        let container_path = container_path.to_string();
        if source.starts_with('/') {
            Some(Self::Host {
                host_path: source.to_string(),
                container_path,
            })
        } else {
            Some(Self::Named {
                volume_name: source.to_string(),
                container_path,
            })
        }
    }

    #[must_use]
    pub fn container_path(&self) -> &str {
        match self {
            Self::Host { container_path, .. } | Self::Named { container_path, .. } => {
                container_path
            }
        }
    }
}

/// Platform-specific per-service options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceExtras {
    /// Keep the service off the public HTTP router.
    pub not_expose_as_web_app: bool,
    /// Port the container listens on for HTTP.
    pub container_http_port: u16,
    /// Custom build instructions used instead of an image.
    pub dockerfile_lines: Option<Vec<String>>,
    pub websocket_support: bool,
}

/// Default container HTTP port.
pub const DEFAULT_CONTAINER_HTTP_PORT: u16 = 80;

impl Default for ServiceExtras {
    fn default() -> Self {
        Self {
            not_expose_as_web_app: false,
            container_http_port: DEFAULT_CONTAINER_HTTP_PORT,
            dockerfile_lines: None,
            websocket_support: false,
        }
    }
}

/// How the platform should build the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildSource {
    Image(String),
    DockerfileLines(Vec<String>),
}

/// One service of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: AppName,
    pub image: Option<String>,
    /// Names of services that must be fully deployed first.
    pub depends_on: Vec<String>,
    /// Environment variables in document order.
    pub environment: Vec<(String, String)>,
    pub volumes: Vec<VolumeMount>,
    pub extras: ServiceExtras,
}

impl ServiceSpec {
    /// Whether the service needs persistent storage on the platform.
    #[must_use]
    pub fn has_persistent_data(&self) -> bool {
        !self.volumes.is_empty()
    }

    /// Build definition to push; dockerfile lines take precedence over an image.
    #[must_use]
    pub fn build_source(&self) -> Option<BuildSource> {
        if let Some(lines) = &self.extras.dockerfile_lines {
            return Some(BuildSource::DockerfileLines(lines.clone()));
        }
        self.image.clone().map(BuildSource::Image)
    }
}

/// Descriptive metadata shown around a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleInfo {
    pub display_name: Option<String>,
    pub start_instructions: Option<String>,
    pub end_instructions: Option<String>,
}

/// A parsed multi-service manifest ready for deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    /// Services in discovery (document) order. Names are unique.
    pub services: Vec<ServiceSpec>,
    pub required_variables: Vec<ManifestVariable>,
    pub info: BundleInfo,
}

impl Bundle {
    /// Look up a service by name.
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.iter().find(|s| s.name.as_str() == name)
    }

    #[must_use]
    pub fn service_names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Display for BuildSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(image) => write!(f, "image {image}"),
            Self::DockerfileLines(lines) => write!(f, "{} dockerfile lines", lines.len()),
        }
    }
}
