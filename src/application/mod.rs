//! Application services (use cases).
//!
//! These services coordinate domain logic with the platform and manifest
//! ports to implement the crate's use cases.

pub mod app;
pub mod bundle;
pub mod context;

pub use app::AppService;
pub use bundle::{BundleOrchestrator, DeployRequest};
pub use context::DeployContext;
