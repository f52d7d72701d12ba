//! Handler for `rigger render`: offline preview of a resolved bundle.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::RenderArgs;
use crate::adapter::inbound::cli::{output, source, vars};
use crate::application::bundle::{plan, ManifestParser, VariableResolver};
use crate::domain::{AppName, Bundle, PlannedService};
use crate::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Pass")]
    pass: usize,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Depends on")]
    depends_on: String,
    #[tabled(rename = "Persistent")]
    persistent: &'static str,
}

/// Execute `render`.
///
/// Talks to the platform only when no `--root-domain` is given.
pub async fn execute(args: RenderArgs, config: &Config) -> Result<()> {
    let variables = vars::parse_vars(&args.manifest.vars)?;
    let instance = AppName::parse(args.manifest.name.as_str())?;

    let manifests = bootstrap::manifest_source(config)?;
    let raw = source::read_manifest(&args.manifest, manifests.as_ref()).await?;

    let root_domain = match args.root_domain {
        Some(domain) => domain,
        None => bootstrap::platform(config).await?.context.root_domain,
    };

    let resolved = VariableResolver::new(root_domain.as_str()).resolve(&raw, &instance, &variables)?;
    let document = resolved.document.clone();
    let bundle = ManifestParser::parse_resolved(resolved)?;
    let order = plan(&bundle)?;

    if output::is_json() {
        output::emit_json(json!({
            "command": "render",
            "instance": instance.as_str(),
            "root_domain": root_domain,
            "display_name": bundle.info.display_name,
            "order": order
                .iter()
                .map(|step| json!({ "service": step.name, "pass": step.pass }))
                .collect::<Vec<_>>(),
            "document": args.show_document.then_some(document.as_str()),
        }));
        return Ok(());
    }

    output::banner(env!("CARGO_PKG_VERSION"));
    output::field("Manifest", source::describe(&args.manifest));
    if let Some(name) = &bundle.info.display_name {
        output::field("App", name);
    }
    output::field("Instance", &instance);
    output::field("Root domain", &root_domain);

    if let Some(instructions) = &bundle.info.start_instructions {
        output::section("About");
        output::lines(instructions);
    }

    output::section("Rollout plan");
    output::lines(&Table::new(rows(&bundle, &order)).to_string());

    if args.show_document {
        output::section("Resolved manifest");
        output::lines(&document);
    }
    output::hint(&format!(
        "run {} to deploy",
        output::highlight(format!("rigger deploy ... --name {instance}"))
    ));
    Ok(())
}

fn rows(bundle: &Bundle, order: &[PlannedService]) -> Vec<PlanRow> {
    order
        .iter()
        .filter_map(|step| bundle.service(&step.name).map(|spec| (step, spec)))
        .map(|(step, spec)| PlanRow {
            pass: step.pass,
            service: step.name.clone(),
            source: spec
                .build_source()
                .map(|source| source.to_string())
                .unwrap_or_default(),
            depends_on: spec.depends_on.join(", "),
            persistent: if spec.has_persistent_data() { "yes" } else { "no" },
        })
        .collect()
}
