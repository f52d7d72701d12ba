//! Interactive variable prompts.

use std::collections::BTreeMap;

use dialoguer::{theme::ColorfulTheme, Input};

use crate::adapter::inbound::cli::output;
use crate::application::bundle::parser::parse_variables;
use crate::application::bundle::resolver::{normalize_variable_id, VARIABLE_PREFIX};
use crate::domain::ManifestVariable;
use crate::error::{ConfigError, Result};

/// Ask for every declared variable the caller did not supply.
///
/// Defaults that are themselves placeholders (e.g. generated secrets) are
/// left for the resolver to expand and are not prompted.
pub fn prompt_missing(raw: &str, supplied: &mut BTreeMap<String, String>) -> Result<()> {
    if output::is_json() {
        return Err(ConfigError::InvalidValue {
            field: "interactive",
            reason: "--interactive cannot be combined with --json".to_string(),
        }
        .into());
    }

    let provided: Vec<String> = supplied.keys().map(|key| normalize_variable_id(key)).collect();
    let pending: Vec<ManifestVariable> = parse_variables(raw)?
        .into_iter()
        .filter(|variable| !provided.contains(&variable.id))
        .filter(|variable| {
            !variable
                .default_value
                .as_deref()
                .is_some_and(|default| default.contains(VARIABLE_PREFIX))
        })
        .collect();

    if pending.is_empty() {
        return Ok(());
    }

    output::section("Variables");
    let theme = ColorfulTheme::default();
    for variable in pending {
        if let Some(description) = &variable.description {
            output::note(description);
        }
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(&variable.label)
            .allow_empty(variable.default_value.is_some());
        if let Some(default) = &variable.default_value {
            input = input.default(default.clone());
        }
        let value = input.interact_text()?;
        supplied.insert(variable.id, value);
    }
    Ok(())
}
