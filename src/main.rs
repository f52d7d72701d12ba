use std::process::ExitCode;

use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use rigger::adapter::inbound::cli::command::Cli;
use rigger::adapter::inbound::cli::output::{self, OutputConfig};
use rigger::adapter::inbound::cli::{self, diagnostic};
use rigger::infrastructure::config::settings::Config;

/// Exit status after Ctrl-C, matching shell convention for SIGINT.
const INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    let config_path = cli.config.display().to_string();
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            let content = std::fs::read_to_string(&cli.config).unwrap_or_default();
            eprintln!(
                "{:?}",
                diagnostic::report(err, Some((config_path.as_str(), content.as_str())))
            );
            return ExitCode::FAILURE;
        }
    };

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => Some("warn"),
        (false, 0) => None,
        (false, 1) => Some("debug"),
        (false, _) => Some("trace"),
    };
    config.init_logging(level);
    info!("rigger starting");

    tokio::select! {
        result = cli::run(cli.command, &cli.config, &config) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!(error = %err, "Command failed");
                eprintln!("{:?}", diagnostic::report(err, None));
                ExitCode::FAILURE
            }
        },
        _ = signal::ctrl_c() => {
            warn!("Shutdown signal received");
            output::warning("Interrupted; services deployed so far are left in place");
            ExitCode::from(INTERRUPTED)
        }
    }
}
