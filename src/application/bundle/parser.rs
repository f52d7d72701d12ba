//! Manifest document parsing.
//!
//! The document is a compose-like YAML file with a `services` mapping and a
//! `caproverOneClickApp` section declaring variables. Variable declarations
//! are read from the raw document by [`parse_variables`]; the parser of the
//! substituted document skips them. Parsing does not check that dependencies
//! exist; the scheduler reports unresolvable services.

use regex::Regex;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use super::resolver::ResolvedManifest;
use crate::domain::{
    AppName, Bundle, BundleInfo, ManifestVariable, ServiceExtras, ServiceSpec, VolumeMount,
    DEFAULT_CONTAINER_HTTP_PORT,
};
use crate::error::DeployError;

/// Manifest format version this parser understands.
pub const SUPPORTED_CAPTAIN_VERSION: u64 = 4;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    captain_version: Option<Value>,
    services: Option<Mapping>,
    caprover_one_click_app: Option<RawOneClickApp>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOneClickApp {
    display_name: Option<Value>,
    instructions: Option<RawInstructions>,
}

#[derive(Debug, Default, Deserialize)]
struct RawInstructions {
    start: Option<Value>,
    end: Option<Value>,
}

// Values are kept loose: a default may read as a number or bool.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVariable {
    id: Value,
    label: Option<Value>,
    default_value: Option<Value>,
    description: Option<Value>,
    valid_regex: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawService {
    image: Option<Value>,
    #[serde(default)]
    depends_on: Vec<Value>,
    environment: Option<Value>,
    #[serde(default)]
    volumes: Vec<Value>,
    #[serde(rename = "caproverExtra")]
    caprover_extra: Option<RawExtras>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExtras {
    not_expose_as_web_app: Option<Value>,
    container_http_port: Option<Value>,
    dockerfile_lines: Option<Vec<Value>>,
    websocket_support: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDeclarations {
    #[serde(default)]
    variables: Vec<RawVariable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariablesOnly {
    caprover_one_click_app: Option<RawDeclarations>,
}

fn invalid(message: impl Into<String>) -> DeployError {
    DeployError::ManifestParse(message.into())
}

/// Render a YAML scalar as text. Non-scalars yield `None`.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Tagged(tagged) => scalar(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn required_scalar(value: &Value, what: &str) -> Result<String, DeployError> {
    scalar(value).ok_or_else(|| invalid(format!("{what} must be a scalar value")))
}

fn optional_text(value: Option<&Value>, what: &str) -> Result<Option<String>, DeployError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => required_scalar(value, what).map(Some),
    }
}

fn flag(value: Option<&Value>, what: &str) -> Result<bool, DeployError> {
    match value {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(invalid(format!("{what} must be true or false, got '{other}'"))),
        },
        Some(_) => Err(invalid(format!("{what} must be true or false"))),
    }
}

fn port(value: Option<&Value>, service: &str) -> Result<u16, DeployError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(DEFAULT_CONTAINER_HTTP_PORT),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse::<u16>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(port) if port > 0 => Ok(port),
        _ => Err(invalid(format!(
            "service {service}: containerHttpPort must be a port number"
        ))),
    }
}

fn environment(value: Option<&Value>, service: &str) -> Result<Vec<(String, String)>, DeployError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Mapping(map)) => map
            .iter()
            .map(|(key, value)| {
                let key = required_scalar(key, "environment key")?;
                let value = scalar(value).ok_or_else(|| {
                    invalid(format!("service {service}: environment value for {key} must be a scalar"))
                })?;
                Ok((key, value))
            })
            .collect(),
        // Compose list form: `- KEY=value`
        Some(Value::Sequence(entries)) => entries
            .iter()
            .map(|entry| {
                let entry = required_scalar(entry, "environment entry")?;
                let (key, value) = entry.split_once('=').unwrap_or((entry.as_str(), ""));
                Ok((key.trim().to_string(), value.to_string()))
            })
            .collect(),
        Some(_) => Err(invalid(format!(
            "service {service}: environment must be a mapping or a list"
        ))),
    }
}

fn variables(raw: &[RawVariable]) -> Result<Vec<ManifestVariable>, DeployError> {
    raw.iter()
        .map(|variable| {
            let id = required_scalar(&variable.id, "variable id")?;
            if id.is_empty() {
                return Err(invalid("variable id cannot be empty"));
            }
            let label = optional_text(variable.label.as_ref(), "variable label")?
                .unwrap_or_else(|| id.clone());
            Ok(ManifestVariable {
                default_value: optional_text(variable.default_value.as_ref(), "defaultValue")?,
                description: optional_text(variable.description.as_ref(), "description")?,
                valid_regex: optional_text(variable.valid_regex.as_ref(), "validRegex")?
                    .filter(|pattern| !pattern.is_empty()),
                id,
                label,
            })
        })
        .collect()
}

/// Parse only the declared variables of an unresolved document.
pub fn parse_variables(document: &str) -> Result<Vec<ManifestVariable>, DeployError> {
    let raw: Option<VariablesOnly> =
        serde_yaml::from_str(document).map_err(|err| invalid(err.to_string()))?;
    match raw.and_then(|raw| raw.caprover_one_click_app) {
        Some(app) => variables(&app.variables),
        None => Ok(Vec::new()),
    }
}

/// Compile a `validRegex` given as `/pattern/flags` or a bare pattern.
pub fn compile_valid_regex(pattern: &str) -> Result<Regex, DeployError> {
    let trimmed = pattern.trim();
    let (body, flags) = match trimmed.strip_prefix('/').and_then(|rest| {
        rest.rfind('/').map(|end| (&rest[..end], &rest[end + 1..]))
    }) {
        Some((body, flags)) => (body, flags),
        None => (trimmed, ""),
    };

    let inline: String = flags
        .chars()
        .filter(|flag| matches!(flag, 'i' | 'm' | 's'))
        .collect();
    let source = if inline.is_empty() {
        body.to_string()
    } else {
        format!("(?{inline}){body}")
    };

    Regex::new(&source).map_err(|err| invalid(format!("invalid validRegex {pattern}: {err}")))
}

/// Parses resolved manifest documents into [`Bundle`]s.
pub struct ManifestParser;

impl ManifestParser {
    /// Parse a resolved document and attach the variables it declared.
    pub fn parse_resolved(resolved: ResolvedManifest) -> Result<Bundle, DeployError> {
        let mut bundle = Self::parse(&resolved.document)?;
        bundle.required_variables = resolved.declared;
        Ok(bundle)
    }

    /// Parse services and bundle info. The variables section is not read,
    /// so `required_variables` stays empty.
    pub fn parse(document: &str) -> Result<Bundle, DeployError> {
        let raw: Option<RawManifest> =
            serde_yaml::from_str(document).map_err(|err| invalid(err.to_string()))?;
        let raw = raw.ok_or_else(|| invalid("manifest is empty"))?;

        if let Some(version) = &raw.captain_version {
            let version = scalar(version).unwrap_or_default();
            if version.trim() != SUPPORTED_CAPTAIN_VERSION.to_string() {
                return Err(invalid(format!(
                    "unsupported captainVersion {version}, expected {SUPPORTED_CAPTAIN_VERSION}"
                )));
            }
        }

        let services = raw.services.unwrap_or_default();
        if services.is_empty() {
            return Err(invalid("manifest declares no services"));
        }

        let mut specs: Vec<ServiceSpec> = Vec::with_capacity(services.len());
        for (key, value) in services {
            let name = required_scalar(&key, "service name")?;
            let spec = parse_service(&name, value)?;
            if specs.iter().any(|existing| existing.name == spec.name) {
                return Err(invalid(format!("service {name} is declared twice")));
            }
            specs.push(spec);
        }

        let info = match raw.caprover_one_click_app {
            Some(app) => {
                let instructions = app.instructions.unwrap_or_default();
                BundleInfo {
                    display_name: optional_text(app.display_name.as_ref(), "displayName")?,
                    start_instructions: optional_text(instructions.start.as_ref(), "instructions.start")?,
                    end_instructions: optional_text(instructions.end.as_ref(), "instructions.end")?,
                }
            }
            None => BundleInfo::default(),
        };

        Ok(Bundle {
            services: specs,
            required_variables: Vec::new(),
            info,
        })
    }
}

fn parse_service(name: &str, value: Value) -> Result<ServiceSpec, DeployError> {
    let app_name = AppName::parse(name)
        .map_err(|err| invalid(format!("invalid service name: {err}")))?;
    let raw: RawService = match value {
        Value::Null => RawService::default(),
        value => serde_yaml::from_value(value)
            .map_err(|err| invalid(format!("service {name}: {err}")))?,
    };
    let extras = raw.caprover_extra.unwrap_or_default();

    let depends_on = raw
        .depends_on
        .iter()
        .map(|dep| required_scalar(dep, "depends_on entry"))
        .collect::<Result<Vec<_>, _>>()?;

    let volumes = raw
        .volumes
        .iter()
        .map(|entry| {
            let entry = required_scalar(entry, "volume entry")?;
            VolumeMount::parse(&entry).ok_or_else(|| {
                invalid(format!(
                    "service {name}: volume '{entry}' must look like source:/container/path"
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let dockerfile_lines = extras
        .dockerfile_lines
        .as_ref()
        .map(|lines| {
            lines
                .iter()
                .map(|line| required_scalar(line, "dockerfile line"))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?;

    let image = optional_text(raw.image.as_ref(), "image")?.filter(|image| !image.is_empty());
    if image.is_none() && dockerfile_lines.is_none() {
        return Err(invalid(format!(
            "service {name} declares neither an image nor dockerfileLines"
        )));
    }

    Ok(ServiceSpec {
        name: app_name,
        image,
        depends_on,
        environment: environment(raw.environment.as_ref(), name)?,
        volumes,
        extras: ServiceExtras {
            not_expose_as_web_app: flag(extras.not_expose_as_web_app.as_ref(), "notExposeAsWebApp")?,
            container_http_port: port(extras.container_http_port.as_ref(), name)?,
            dockerfile_lines,
            websocket_support: flag(extras.websocket_support.as_ref(), "websocketSupport")?,
        },
    })
}
