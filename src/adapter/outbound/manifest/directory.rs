//! Manifest repository on the local filesystem.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::http::validate_name;
use crate::error::{Error, Result};
use crate::port::ManifestSource;

/// Reads `<directory>/<name>.<extension>`.
#[derive(Debug, Clone)]
pub struct DirectoryManifestRepository {
    directory: PathBuf,
    extension: String,
}

impl DirectoryManifestRepository {
    pub fn new(directory: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        let extension: String = extension.into();
        Self {
            directory: directory.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn manifest_path(&self, name: &str) -> Result<PathBuf> {
        let name = validate_name(name)?;
        Ok(self.directory.join(format!("{name}.{}", self.extension)))
    }
}

#[async_trait]
impl ManifestSource for DirectoryManifestRepository {
    async fn fetch(&self, name: &str) -> Result<String> {
        let path = self.manifest_path(name)?;
        debug!(path = %path.display(), "Reading manifest");
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| Error::ManifestFetch {
                name: name.to_string(),
                reason: format!("{}: {err}", path.display()),
            })
    }

    fn location(&self) -> String {
        self.directory.display().to_string()
    }
}
