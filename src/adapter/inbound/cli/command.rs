//! Command-line interface definitions.
//!
//! Defines the `rigger` command tree with `clap`: bundle deployment and
//! preview, single-app management, backups and configuration checks.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Default configuration file, resolved against the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "rigger.toml";

/// Deploy multi-service bundles to a self-hosted application platform
#[derive(Parser, Debug)]
#[command(name = "rigger")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy a bundle from the manifest repository or a local file
    Deploy(DeployArgs),

    /// Resolve a manifest and show the rollout plan without deploying
    Render(RenderArgs),

    /// Manage individual apps
    #[command(subcommand)]
    Apps(AppsCommand),

    /// Platform backups
    #[command(subcommand)]
    Backup(BackupCommand),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Where the manifest comes from and how it is resolved.
#[derive(Args, Debug, Clone)]
pub struct ManifestArgs {
    /// Manifest name in the repository
    #[arg(required_unless_present = "file")]
    pub manifest: Option<String>,

    /// Read the manifest from a local file instead of the repository
    #[arg(long, conflicts_with = "manifest")]
    pub file: Option<PathBuf>,

    /// Instance name; becomes `$$cap_appname`
    #[arg(short, long)]
    pub name: String,

    /// Variable value as KEY=VALUE (repeatable; `$$cap_` prefix optional)
    #[arg(long = "var", value_name = "KEY=VALUE")]
    pub vars: Vec<String>,
}

/// Arguments for `rigger deploy`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Prompt for variables that were not supplied
    #[arg(short, long)]
    pub interactive: bool,
}

/// Arguments for `rigger render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Root domain to resolve against instead of asking the platform
    #[arg(long)]
    pub root_domain: Option<String>,

    /// Print the resolved manifest document
    #[arg(long)]
    pub show_document: bool,
}

/// Subcommands for `rigger apps`.
#[derive(Subcommand, Debug)]
pub enum AppsCommand {
    /// List all apps
    List,
    /// Show one app
    Get(AppNameArg),
    /// Register an empty app
    Create(AppsCreateArgs),
    /// Delete an app
    Delete(AppsDeleteArgs),
    /// Manage custom domains
    #[command(subcommand)]
    Domain(DomainCommand),
}

#[derive(Args, Debug)]
pub struct AppNameArg {
    /// App name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct AppsCreateArgs {
    /// App name
    pub name: String,

    /// Give the app persistent storage
    #[arg(long)]
    pub persistent: bool,
}

#[derive(Args, Debug)]
pub struct AppsDeleteArgs {
    /// App name
    pub name: String,

    /// Named volume to remove with the app (repeatable)
    #[arg(long = "volume")]
    pub volumes: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Subcommands for `rigger apps domain`.
#[derive(Subcommand, Debug)]
pub enum DomainCommand {
    /// Attach a custom domain
    Add(DomainArgs),
    /// Enable TLS for an attached domain
    Tls(DomainArgs),
}

#[derive(Args, Debug)]
pub struct DomainArgs {
    /// App name
    pub name: String,
    /// Fully qualified domain
    pub domain: String,
}

/// Subcommands for `rigger backup`.
#[derive(Subcommand, Debug)]
pub enum BackupCommand {
    /// Ask the platform to prepare a backup archive
    Create,
}

/// Subcommands for `rigger config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied
    Show,
    /// Validate the configuration file
    Validate,
}
