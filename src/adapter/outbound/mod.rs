//! Outbound adapters (driven side).

pub mod manifest;
pub mod platform;
