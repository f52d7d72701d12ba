//! Manifest loading for commands that accept a name or `--file`.

use crate::adapter::inbound::cli::command::ManifestArgs;
use crate::error::{Error, Result};
use crate::port::ManifestSource;

/// Read the manifest named by `args`, preferring a local `--file`.
pub async fn read_manifest(args: &ManifestArgs, repository: &dyn ManifestSource) -> Result<String> {
    match (&args.file, &args.manifest) {
        (Some(path), _) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|err| Error::ManifestFetch {
                    name: path.display().to_string(),
                    reason: err.to_string(),
                })
        }
        (None, Some(name)) => repository.fetch(name).await,
        (None, None) => Err(Error::Other("no manifest name or --file given".to_string())),
    }
}

/// Label for the manifest in output.
#[must_use]
pub fn describe(args: &ManifestArgs) -> String {
    match (&args.file, &args.manifest) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(name)) => name.clone(),
        (None, None) => String::new(),
    }
}
