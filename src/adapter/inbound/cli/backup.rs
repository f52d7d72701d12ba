//! Handler for `rigger backup`.

use serde_json::json;

use crate::adapter::inbound::cli::command::BackupCommand;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Execute a `backup` subcommand.
pub async fn execute(command: BackupCommand, config: &Config) -> Result<()> {
    match command {
        BackupCommand::Create => {
            let platform = bootstrap::platform(config).await?;
            let token = bootstrap::app_service(&platform).create_backup().await?;

            if output::is_json() {
                output::emit_json(json!({
                    "command": "backup.create",
                    "download_token": token.0,
                }));
                return Ok(());
            }
            output::success("Backup prepared");
            output::field("Download token", &token.0);
            Ok(())
        }
    }
}
