//! Rigger - multi-service bundle deployment for self-hosted app platforms.
//!
//! A bundle manifest describes several services (a database, a web app, a
//! worker...) with placeholders for instance-specific values. Rigger
//! resolves the placeholders, orders the services by their declared
//! dependencies and drives the platform's control API through
//! create → configure → deploy → await build for each one.
//!
//! # Architecture
//!
//! Hexagonal layout:
//!
//! - [`domain`] - Manifest, app and deployment types
//! - [`port`] - Traits the application depends on (`PlatformApi`, `ManifestSource`, `DeployObserver`)
//! - [`application`] - Use cases: bundle orchestration and single-app operations
//! - [`adapter`] - CLI, HTTP control API client, manifest repositories
//! - [`infrastructure`] - Configuration and wiring
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use rigger::application::bundle::prepare_bundle;
//! use rigger::domain::AppName;
//!
//! # fn main() -> rigger::error::Result<()> {
//! let manifest = "services:\n  $$cap_appname:\n    image: nginx\n";
//! let instance = AppName::parse("site")?;
//! let bundle = prepare_bundle(manifest, "apps.example.com", &instance, &BTreeMap::new())?;
//! assert_eq!(bundle.service_names(), vec!["site"]);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
