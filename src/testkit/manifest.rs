//! In-memory [`ManifestSource`].

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::port::ManifestSource;

/// Manifest repository backed by a map of name → document.
#[derive(Debug, Clone, Default)]
pub struct StaticManifests {
    documents: HashMap<String, String>,
}

impl StaticManifests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, document: &str) -> Self {
        self.documents.insert(name.to_string(), document.to_string());
        self
    }
}

#[async_trait]
impl ManifestSource for StaticManifests {
    async fn fetch(&self, name: &str) -> Result<String> {
        self.documents
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ManifestFetch {
                name: name.to_string(),
                reason: "not found".to_string(),
            })
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
