//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the control API, the manifest repository and
//! progress reporting.

pub mod manifest;
pub mod observer;
pub mod platform;
