//! Handler for `rigger deploy`.

use std::sync::Arc;

use serde_json::json;

use crate::adapter::inbound::cli::command::DeployArgs;
use crate::adapter::inbound::cli::progress::ConsoleObserver;
use crate::adapter::inbound::cli::{output, prompt, source, vars};
use crate::application::{DeployContext, DeployRequest};
use crate::domain::{AppName, DeploymentReport};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

/// Execute `deploy`.
pub async fn execute(args: DeployArgs, config: &Config) -> Result<()> {
    let mut variables = vars::parse_vars(&args.manifest.vars)?;
    let instance = AppName::parse(args.manifest.name.as_str())?;

    let platform = bootstrap::platform(config).await?;
    let manifests = bootstrap::manifest_source(config)?;
    let orchestrator = bootstrap::orchestrator(
        config,
        &platform,
        Arc::clone(&manifests),
        Arc::new(ConsoleObserver),
    );

    output::banner(env!("CARGO_PKG_VERSION"));
    output::field("Manifest", source::describe(&args.manifest));
    output::field("Instance", &instance);
    output::field("Platform", &platform.context);
    output::field("Root domain", &platform.context.root_domain);

    let report = match (&args.manifest.manifest, args.manifest.file.is_some() || args.interactive) {
        (Some(name), false) => {
            orchestrator
                .deploy(&DeployRequest {
                    manifest: name.clone(),
                    instance: instance.to_string(),
                    variables,
                })
                .await?
        }
        _ => {
            let raw = source::read_manifest(&args.manifest, manifests.as_ref()).await?;
            if args.interactive {
                prompt::prompt_missing(&raw, &mut variables)?;
            }
            orchestrator
                .deploy_document(&raw, instance.as_str(), &variables)
                .await?
        }
    };

    print_report(&report, &platform.context);
    Ok(())
}

fn print_report(report: &DeploymentReport, context: &DeployContext) {
    if output::is_json() {
        output::emit_json(json!({
            "command": "deploy",
            "platform": context.base_url,
            "namespace": context.namespace,
            "instance": report.instance,
            "deployed": report.deployed,
            "end_instructions": report.end_instructions,
        }));
        return;
    }

    output::section("Deployed");
    output::success(&format!(
        "{} service(s) deployed for {}",
        report.deployed.len(),
        output::highlight(&report.instance)
    ));
    if let Some(instructions) = &report.end_instructions {
        output::section("Next steps");
        output::lines(instructions);
    }
}
