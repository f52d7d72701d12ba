//! Manifest repository port.

use async_trait::async_trait;

use crate::error::Result;

/// Source of raw manifest documents addressed by name.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Fetch the raw document text for `name`.
    async fn fetch(&self, name: &str) -> Result<String>;

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}
