//! Platform-agnostic domain types.

pub mod app;
pub mod deploy;
pub mod id;
pub mod manifest;

pub use app::{
    AppDefinition, AppUpdate, BackupToken, EnvVar, ServiceRuntimeInfo, SystemInfo,
    BUNDLE_INSTANCE_COUNT,
};
pub use deploy::{BuildOutcome, DeployEvent, DeployStep, DeploymentReport, PlannedService};
pub use id::AppName;
pub use manifest::{
    BuildSource, Bundle, BundleInfo, ManifestVariable, ServiceExtras, ServiceSpec, VolumeMount,
    DEFAULT_CONTAINER_HTTP_PORT,
};
