//! Infrastructure configuration modules.

pub mod deploy;
pub mod logging;
pub mod manifest;
pub mod platform;
pub mod settings;
