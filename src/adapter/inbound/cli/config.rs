//! Handler for the `config` command group.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::command::ConfigCommand;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

/// Execute a `config` subcommand against an already loaded configuration.
pub fn execute(command: ConfigCommand, path: &Path, config: &Config) -> Result<()> {
    match command {
        ConfigCommand::Show => show(config),
        ConfigCommand::Validate => validate(path, config),
    }
}

fn show(config: &Config) -> Result<()> {
    if output::is_json() {
        output::emit_json(json!({
            "command": "config.show",
            "config": config,
            "credentials": credential_source(config),
        }));
        return Ok(());
    }

    output::section("Effective configuration");
    output::lines(&config.to_toml()?);
    output::section("Credentials");
    output::field("Source", credential_source(config));
    Ok(())
}

/// Loading already validated the file; report what is still missing for
/// commands that talk to the platform.
fn validate(path: &Path, config: &Config) -> Result<()> {
    let exists = path.exists();
    let platform_ready = config.require_platform_url().is_ok();

    if output::is_json() {
        output::emit_json(json!({
            "command": "config.validate",
            "path": path.display().to_string(),
            "file_found": exists,
            "valid": true,
            "platform_url": platform_ready,
            "credentials": credential_source(config),
        }));
        return Ok(());
    }

    if exists {
        output::success(&format!("{} is valid", path.display()));
    } else {
        output::warning(&format!("{} not found; using defaults", path.display()));
    }
    if !platform_ready {
        output::warning("platform.url is not set (set it or RIGGER_URL)");
    }
    if credential_source(config) == "none" {
        output::warning("no credentials (set RIGGER_TOKEN or RIGGER_PASSWORD)");
    }
    Ok(())
}

fn credential_source(config: &Config) -> &'static str {
    if config.platform.token.is_some() {
        "token"
    } else if config.platform.password.is_some() {
        "password"
    } else {
        "none"
    }
}
