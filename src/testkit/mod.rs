//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`platform`] - Scriptable [`PlatformApi`](crate::port::PlatformApi): `FakePlatform`.
//! - [`manifest`] - In-memory [`ManifestSource`](crate::port::ManifestSource).
//! - [`observer`] - Event-recording [`DeployObserver`](crate::port::DeployObserver).
//! - [`domain`] - Builders for services, bundles and sample manifests.
//! - [`config`] - Canonical zero-delay configurations.

pub mod config;
pub mod domain;
pub mod manifest;
pub mod observer;
pub mod platform;
