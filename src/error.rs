use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Failures that abort a bundle deployment or an app operation.
///
/// Every variant is terminal for the run that produced it: services that
/// were already deployed stay as they are.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    #[error("missing value for variable {id} ({label}){}", describe(description))]
    MissingVariable {
        id: String,
        label: String,
        description: Option<String>,
    },

    #[error("value for variable {id} ({label}) does not match {pattern}")]
    InvalidVariable {
        id: String,
        label: String,
        pattern: String,
    },

    #[error("invalid manifest: {0}")]
    ManifestParse(String),

    #[error("cannot resolve dependencies for: {}", pending.join(", "))]
    DependencyResolution { pending: Vec<String> },

    #[error("build failed for service {service}")]
    BuildFailed { service: String },

    #[error("build for service {service} did not finish after {polls} polls")]
    BuildTimeout { service: String, polls: u32 },

    #[error("apps already exist: {}", names.join(", "))]
    NameConflict { names: Vec<String> },

    #[error("invalid app name '{name}': {reason}")]
    InvalidAppName { name: String, reason: &'static str },

    #[error("app not found: {0}")]
    AppNotFound(String),

    #[error("deployment did not complete within {secs}s")]
    DeployTimeout { secs: u64 },
}

fn describe(description: &Option<String>) -> String {
    match description {
        Some(text) if !text.trim().is_empty() => format!(": {}", text.trim()),
        _ => String::new(),
    }
}

/// Errors reported while talking to the control API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Connection-level failure; presumed recoverable by retrying.
    #[error("transient network error: {0}")]
    Transient(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// The platform processed the request and reported a failure.
    #[error("remote operation failed ({status}): {description}")]
    Operation { status: i64, description: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("manifest '{name}' unavailable: {reason}")]
    ManifestFetch { name: String, reason: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is a retryable transport failure.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Remote(err) if err.is_transient())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        // dialoguer::Error wraps an IO error
        Error::Io(std::io::Error::other(err.to_string()))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Deploy(DeployError::ManifestParse(err.to_string()))
    }
}
