//! CLI module graph and command dispatch.

pub mod apps;
pub mod backup;
pub mod command;
pub mod config;
pub mod deploy;
pub mod diagnostic;
pub mod output;
pub mod progress;
pub mod prompt;
pub mod render;
pub mod source;
pub mod vars;

use std::path::Path;

use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use command::Commands;

/// Run a parsed command.
pub async fn run(command: Commands, config_path: &Path, config: &Config) -> Result<()> {
    match command {
        Commands::Deploy(args) => deploy::execute(args, config).await,
        Commands::Render(args) => render::execute(args, config).await,
        Commands::Apps(command) => apps::execute(command, config).await,
        Commands::Backup(command) => backup::execute(command, config).await,
        Commands::Config(command) => config::execute(command, config_path, config),
    }
}
