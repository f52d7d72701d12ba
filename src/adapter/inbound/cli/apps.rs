//! Handlers for the `apps` command group.

use dialoguer::{theme::ColorfulTheme, Confirm};
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::{AppsCommand, DomainCommand};
use crate::adapter::inbound::cli::output;
use crate::application::AppService;
use crate::domain::AppDefinition;
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Instances")]
    instances: u32,
    #[tabled(rename = "Persistent")]
    persistent: &'static str,
    #[tabled(rename = "Web")]
    web: String,
    #[tabled(rename = "Domains")]
    domains: String,
}

impl From<&AppDefinition> for AppRow {
    fn from(app: &AppDefinition) -> Self {
        Self {
            name: app.name.clone(),
            instances: app.instance_count,
            persistent: yes_no(app.has_persistent_data),
            web: if app.not_expose_as_web_app {
                "-".to_string()
            } else {
                format!(":{}", app.container_http_port)
            },
            domains: app.custom_domains.join(", "),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Execute an `apps` subcommand.
pub async fn execute(command: AppsCommand, config: &Config) -> Result<()> {
    let platform = bootstrap::platform(config).await?;
    let apps = bootstrap::app_service(&platform);

    match command {
        AppsCommand::List => list(&apps).await,
        AppsCommand::Get(args) => get(&apps, &args.name).await,
        AppsCommand::Create(args) => {
            apps.create_app(&args.name, args.persistent).await?;
            done("apps.create", "Created", &args.name);
            Ok(())
        }
        AppsCommand::Delete(args) => {
            if !args.yes && !confirm_delete(&args.name, &args.volumes)? {
                output::note("Aborted");
                return Ok(());
            }
            apps.delete_app(&args.name, &args.volumes).await?;
            done("apps.delete", "Deleted", &args.name);
            Ok(())
        }
        AppsCommand::Domain(DomainCommand::Add(args)) => {
            apps.add_domain(&args.name, &args.domain).await?;
            done("apps.domain.add", "Attached", &args.domain);
            Ok(())
        }
        AppsCommand::Domain(DomainCommand::Tls(args)) => {
            apps.enable_tls(&args.name, &args.domain).await?;
            done("apps.domain.tls", "Secured", &args.domain);
            Ok(())
        }
    }
}

async fn list(apps: &AppService) -> Result<()> {
    let definitions = apps.list_apps().await?;

    if output::is_json() {
        output::emit_json(json!({
            "command": "apps.list",
            "apps": definitions,
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::section("Apps");
    if definitions.is_empty() {
        output::note("(none)");
        return Ok(());
    }
    let rows: Vec<AppRow> = definitions.iter().map(AppRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}

async fn get(apps: &AppService, name: &str) -> Result<()> {
    let app = apps.get_app(name).await?;

    if output::is_json() {
        output::emit_json(json!({
            "command": "apps.get",
            "app": app,
        }));
        return Ok(());
    }

    output::section(&app.name);
    output::field("Instances", app.instance_count);
    output::field("Persistent", yes_no(app.has_persistent_data));
    output::field("Web app", yes_no(!app.not_expose_as_web_app));
    output::field("HTTP port", app.container_http_port);
    if app.custom_domains.is_empty() {
        output::field("Domains", output::muted("(none)"));
    } else {
        output::field("Domains", app.custom_domains.join(", "));
    }
    Ok(())
}

fn confirm_delete(name: &str, volumes: &[String]) -> Result<bool> {
    if output::is_json() {
        return Ok(false);
    }
    let prompt = if volumes.is_empty() {
        format!("Delete app {name}?")
    } else {
        format!("Delete app {name} and volumes {}?", volumes.join(", "))
    };
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

fn done(command: &str, verb: &str, target: &str) {
    if output::is_json() {
        output::emit_json(json!({ "command": command, "target": target, "ok": true }));
    } else {
        output::app_changed(verb, target);
    }
}
