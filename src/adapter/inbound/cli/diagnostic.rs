//! Miette-based error diagnostics for CLI error presentation.
//!
//! Converts crate errors into diagnostics with a stable code and a help line
//! suggesting the next step. Config parse errors carry the file content with
//! the failing span labeled.

use std::fmt::Display;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::error::{ConfigError, DeployError, Error, RemoteError};

/// Configuration error with source location context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(rigger::config))]
pub struct ConfigDiagnostic {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: SourceSpan,

    #[help]
    pub help: Option<String>,
}

impl ConfigDiagnostic {
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        name: impl AsRef<str>,
        src: impl Into<String>,
        offset: usize,
        len: usize,
    ) -> Self {
        Self {
            message: message.into(),
            src: NamedSource::new(name, src.into()),
            span: (offset, len).into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Any other failure, with a code per error family and optional help.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CommandDiagnostic {
    pub message: String,
    pub code: &'static str,
    pub help: Option<String>,
}

impl Diagnostic for CommandDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn Display + 'a>)
    }
}

/// Render a crate error for the terminal.
///
/// `config_source` is the `(path, content)` of the config file, used to
/// point at the offending line of a parse error.
#[must_use]
pub fn report(err: Error, config_source: Option<(&str, &str)>) -> miette::Report {
    if let (Error::Config(ConfigError::Parse(parse)), Some((path, content))) =
        (&err, config_source)
    {
        if let Some(span) = parse.span() {
            let diagnostic = ConfigDiagnostic::new(
                format!("failed to parse {path}: {}", parse.message()),
                path,
                content,
                span.start,
                span.end.saturating_sub(span.start),
            )
            .with_help("see `rigger config show` for the expected layout");
            return miette::Report::new(diagnostic);
        }
    }

    let (code, help) = classify(&err);
    miette::Report::new(CommandDiagnostic {
        message: err.to_string(),
        code,
        help,
    })
}

fn classify(err: &Error) -> (&'static str, Option<String>) {
    match err {
        Error::Config(ConfigError::MissingField { field }) if field.starts_with("platform") => (
            "rigger::config",
            Some("set platform.url in rigger.toml or the RIGGER_URL environment variable".into()),
        ),
        Error::Config(_) => (
            "rigger::config",
            Some("run `rigger config validate` to check the configuration".into()),
        ),
        Error::Deploy(deploy) => ("rigger::deploy", deploy_help(deploy)),
        Error::Remote(RemoteError::Transient(_) | RemoteError::Timeout(_)) => (
            "rigger::connection",
            Some("check that the platform is reachable and platform.url is correct".into()),
        ),
        Error::Remote(RemoteError::Operation { .. }) => (
            "rigger::remote",
            Some("the platform rejected the request; check credentials and app state".into()),
        ),
        Error::Remote(RemoteError::Decode(_)) => ("rigger::remote", None),
        Error::ManifestFetch { .. } => (
            "rigger::manifest",
            Some("check the manifest name, or pass a local manifest with --file".into()),
        ),
        Error::Url(_) => (
            "rigger::config",
            Some("platform.url must be an absolute URL such as https://captain.example.com".into()),
        ),
        Error::Json(_) | Error::Io(_) | Error::Other(_) => ("rigger::error", None),
    }
}

fn deploy_help(err: &DeployError) -> Option<String> {
    match err {
        DeployError::MissingVariable { id, .. } => Some(format!(
            "pass --var {}=<value> or use --interactive",
            id.trim_start_matches("$$cap_")
        )),
        DeployError::InvalidVariable { id, .. } => Some(format!(
            "pass a matching value with --var {}=<value>",
            id.trim_start_matches("$$cap_")
        )),
        DeployError::NameConflict { .. } => {
            Some("choose another --name or delete the existing apps first".into())
        }
        DeployError::InvalidAppName { .. } => {
            Some("use lowercase letters, digits and '-', e.g. my-app".into())
        }
        DeployError::DependencyResolution { .. } => {
            Some("check depends_on for cycles or services missing from the manifest".into())
        }
        DeployError::BuildFailed { .. } | DeployError::BuildTimeout { .. } => {
            Some("inspect the build logs on the platform dashboard".into())
        }
        DeployError::ManifestParse(_)
        | DeployError::AppNotFound(_)
        | DeployError::DeployTimeout { .. } => None,
    }
}
