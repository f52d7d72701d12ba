//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`PlatformApi`] - Control API of the application platform
//! - [`ManifestSource`] - Manifest repository
//! - [`DeployObserver`] - Deployment progress notifications

pub mod outbound;

pub use outbound::manifest::ManifestSource;
pub use outbound::observer::{DeployObserver, NoopObserver};
pub use outbound::platform::PlatformApi;
