//! Manifest placeholder expansion.
//!
//! Resolution runs in a fixed order because later steps read names injected
//! by earlier ones:
//!
//! 1. every `$$cap_gen_random_hex(N)` becomes N fresh random hex characters;
//! 2. caller values are merged with the reserved app name and root domain;
//! 3. declared variables without a value fall back to their default;
//! 4. one literal substitution pass replaces every variable token.

use std::collections::BTreeMap;

use rand::rngs::OsRng;
use rand::RngCore;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use super::parser::{compile_valid_regex, parse_variables};
use crate::domain::{AppName, ManifestVariable};
use crate::error::DeployError;

/// Prefix shared by every manifest variable token.
pub const VARIABLE_PREFIX: &str = "$$cap_";
/// Reserved token for the instance name.
pub const APP_NAME_VARIABLE: &str = "$$cap_appname";
/// Reserved token for the platform root domain.
pub const ROOT_DOMAIN_VARIABLE: &str = "$$cap_root_domain";

/// Longest value a random-hex placeholder may ask for.
pub const MAX_RANDOM_HEX_LEN: usize = 4096;

const RANDOM_HEX_PATTERN: &str = r"\$\$cap_gen_random_hex\((\d+)\)";

/// Add the `$$cap_` prefix to a caller-supplied key that lacks it.
#[must_use]
pub fn normalize_variable_id(key: &str) -> String {
    let key = key.trim();
    if key.starts_with(VARIABLE_PREFIX) {
        key.to_string()
    } else {
        format!("{VARIABLE_PREFIX}{key}")
    }
}

/// `len` hexadecimal characters from the operating system's CSPRNG.
#[must_use]
pub fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len.div_ceil(2)];
    OsRng.fill_bytes(&mut bytes);
    let mut encoded = hex::encode(bytes);
    encoded.truncate(len);
    encoded
}

/// Replace each random-hex placeholder with its own fresh value.
pub fn expand_random_hex(raw: &str) -> Result<String, DeployError> {
    let pattern = Regex::new(RANDOM_HEX_PATTERN)
        .map_err(|err| DeployError::ManifestParse(err.to_string()))?;

    for caps in pattern.captures_iter(raw) {
        match caps[1].parse::<usize>() {
            Ok(len) if len <= MAX_RANDOM_HEX_LEN => {}
            _ => {
                return Err(DeployError::ManifestParse(format!(
                    "{} asks for more than {MAX_RANDOM_HEX_LEN} characters",
                    &caps[0]
                )))
            }
        }
    }

    let mut generated = 0usize;
    let expanded = pattern.replace_all(raw, |caps: &Captures<'_>| {
        generated += 1;
        let len = caps[1].parse::<usize>().unwrap_or(0);
        random_hex(len)
    });

    if generated > 0 {
        debug!(count = generated, "Generated random values");
    }
    Ok(expanded.into_owned())
}

/// Literal, non-recursive substitution of every token in `values`.
///
/// All tokens are matched in a single scan, longest first, so a substituted
/// value is never scanned again.
pub fn substitute(document: &str, values: &BTreeMap<String, String>) -> Result<String, DeployError> {
    if values.is_empty() {
        return Ok(document.to_string());
    }

    let mut tokens: Vec<&str> = values.keys().map(String::as_str).collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    let alternation = tokens
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    let pattern =
        Regex::new(&alternation).map_err(|err| DeployError::ManifestParse(err.to_string()))?;

    Ok(pattern
        .replace_all(document, |caps: &Captures<'_>| {
            values.get(&caps[0]).cloned().unwrap_or_default()
        })
        .into_owned())
}

/// A substituted document and the variables it declared before substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifest {
    pub document: String,
    pub declared: Vec<ManifestVariable>,
}

/// Expands manifest placeholders for one instance on one platform.
#[derive(Debug, Clone)]
pub struct VariableResolver {
    root_domain: String,
}

impl VariableResolver {
    #[must_use]
    pub fn new(root_domain: impl Into<String>) -> Self {
        Self {
            root_domain: root_domain.into(),
        }
    }

    /// Produce the fully substituted document.
    ///
    /// Declarations are read before substitution, so the returned ids are
    /// always the `$$cap_` tokens and never the values that replaced them.
    ///
    /// `supplied` keys may omit the `$$cap_` prefix. The reserved app-name and
    /// root-domain entries cannot be overridden.
    pub fn resolve(
        &self,
        raw: &str,
        instance: &AppName,
        supplied: &BTreeMap<String, String>,
    ) -> Result<ResolvedManifest, DeployError> {
        let document = expand_random_hex(raw)?;

        let mut values: BTreeMap<String, String> = supplied
            .iter()
            .map(|(key, value)| (normalize_variable_id(key), value.clone()))
            .collect();
        for reserved in [APP_NAME_VARIABLE, ROOT_DOMAIN_VARIABLE] {
            if values.contains_key(reserved) {
                warn!(variable = reserved, "Ignoring supplied value for reserved variable");
            }
        }
        values.insert(APP_NAME_VARIABLE.to_string(), instance.to_string());
        values.insert(ROOT_DOMAIN_VARIABLE.to_string(), self.root_domain.clone());

        let declared = parse_variables(&document)?;
        for variable in &declared {
            if values.contains_key(&variable.id) {
                continue;
            }
            match &variable.default_value {
                Some(default) => {
                    debug!(variable = %variable.id, "Using default value");
                    values.insert(variable.id.clone(), default.clone());
                }
                None => {
                    return Err(DeployError::MissingVariable {
                        id: variable.id.clone(),
                        label: variable.label.clone(),
                        description: variable.description.clone(),
                    })
                }
            }
        }

        validate_values(&declared, &values)?;
        Ok(ResolvedManifest {
            document: substitute(&document, &values)?,
            declared,
        })
    }
}

fn validate_values(
    declared: &[ManifestVariable],
    values: &BTreeMap<String, String>,
) -> Result<(), DeployError> {
    for variable in declared {
        let Some(pattern) = &variable.valid_regex else {
            continue;
        };
        let regex = compile_valid_regex(pattern)?;
        let value = values.get(&variable.id).map(String::as_str).unwrap_or_default();
        if !regex.is_match(value) {
            return Err(DeployError::InvalidVariable {
                id: variable.id.clone(),
                label: variable.label.clone(),
                pattern: pattern.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> AppName {
        AppName::parse("blog").unwrap()
    }

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn random_hex_has_requested_length_and_alphabet() {
        for len in [0, 1, 7, 16, 33] {
            let value = random_hex(len);
            assert_eq!(value.len(), len);
            assert!(value.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn each_random_hex_occurrence_is_independent() {
        let raw = "a: $$cap_gen_random_hex(32)\nb: $$cap_gen_random_hex(32)\n";
        let expanded = expand_random_hex(raw).unwrap();

        let values: Vec<&str> = expanded
            .lines()
            .map(|line| line.split(": ").nth(1).unwrap())
            .collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].len(), 32);
        assert_eq!(values[1].len(), 32);
        assert_ne!(values[0], values[1]);
    }

    #[test]
    fn random_hex_accepts_long_lengths_up_to_the_cap() {
        let expanded = expand_random_hex("key: $$cap_gen_random_hex(10000)").err();
        assert!(matches!(expanded, Some(DeployError::ManifestParse(_))));

        let overflow = expand_random_hex("key: $$cap_gen_random_hex(99999999999999999999999)");
        assert!(matches!(overflow, Err(DeployError::ManifestParse(_))));

        let raw = format!("key: $$cap_gen_random_hex({MAX_RANDOM_HEX_LEN})");
        let expanded = expand_random_hex(&raw).unwrap();
        assert_eq!(expanded.len(), "key: ".len() + MAX_RANDOM_HEX_LEN);
        assert!(!expanded.contains("$$cap_gen_random_hex"));
    }

    #[test]
    fn normalize_adds_prefix_once() {
        assert_eq!(normalize_variable_id("db_pass"), "$$cap_db_pass");
        assert_eq!(normalize_variable_id("$$cap_db_pass"), "$$cap_db_pass");
    }

    #[test]
    fn substitution_is_not_recursive() {
        let values = vars(&[("$$cap_a", "$$cap_b"), ("$$cap_b", "final")]);
        let out = substitute("x=$$cap_a y=$$cap_b", &values).unwrap();
        assert_eq!(out, "x=$$cap_b y=final");
    }

    #[test]
    fn substitution_prefers_longest_token() {
        let values = vars(&[("$$cap_app", "short"), ("$$cap_appname", "long")]);
        let out = substitute("$$cap_appname/$$cap_app", &values).unwrap();
        assert_eq!(out, "long/short");
    }

    #[test]
    fn reserved_variables_are_injected_and_not_overridable() {
        let raw = "services:\n  $$cap_appname:\n    image: nginx\n    environment:\n      HOST: www.$$cap_root_domain\n";
        let resolver = VariableResolver::new("example.com");
        let supplied = vars(&[("appname", "hijack"), ("$$cap_root_domain", "evil.test")]);

        let out = resolver.resolve(raw, &instance(), &supplied).unwrap().document;

        assert!(out.contains("  blog:\n"));
        assert!(out.contains("HOST: www.example.com"));
        assert!(!out.contains("hijack"));
        assert!(!out.contains("evil.test"));
    }

    #[test]
    fn missing_variable_without_default_fails() {
        let raw = r#"
services:
  $$cap_appname:
    image: postgres:$$cap_pg_version
caproverOneClickApp:
  variables:
    - id: $$cap_pg_version
      label: Postgres version
      description: Major version tag
"#;
        let err = VariableResolver::new("example.com")
            .resolve(raw, &instance(), &BTreeMap::new())
            .unwrap_err();

        assert_eq!(
            err,
            DeployError::MissingVariable {
                id: "$$cap_pg_version".into(),
                label: "Postgres version".into(),
                description: Some("Major version tag".into()),
            }
        );
    }

    #[test]
    fn missing_variable_with_default_uses_default() {
        let raw = r#"
services:
  $$cap_appname:
    image: postgres:$$cap_pg_version
caproverOneClickApp:
  variables:
    - id: $$cap_pg_version
      label: Postgres version
      defaultValue: '16'
"#;
        let out = VariableResolver::new("example.com")
            .resolve(raw, &instance(), &BTreeMap::new())
            .unwrap()
            .document;
        assert!(out.contains("image: postgres:16"));
    }

    #[test]
    fn supplied_value_beats_default() {
        let raw = r#"
services:
  $$cap_appname:
    image: postgres:$$cap_pg_version
caproverOneClickApp:
  variables:
    - id: $$cap_pg_version
      label: Postgres version
      defaultValue: '16'
"#;
        let out = VariableResolver::new("example.com")
            .resolve(raw, &instance(), &vars(&[("pg_version", "15")]))
            .unwrap()
            .document;
        assert!(out.contains("image: postgres:15"));
    }

    #[test]
    fn generated_default_is_expanded_before_defaults_apply() {
        let raw = r#"
services:
  $$cap_appname:
    image: redis
    environment:
      PASSWORD: $$cap_secret
caproverOneClickApp:
  variables:
    - id: $$cap_secret
      label: Secret
      defaultValue: $$cap_gen_random_hex(12)
"#;
        let out = VariableResolver::new("example.com")
            .resolve(raw, &instance(), &BTreeMap::new())
            .unwrap()
            .document;

        let line = out
            .lines()
            .find(|l| l.trim_start().starts_with("PASSWORD:"))
            .unwrap();
        let value = line.trim_start().trim_start_matches("PASSWORD: ");
        assert_eq!(value.len(), 12);
        assert!(value.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn empty_values_resolve_and_keep_declared_ids() {
        let raw = r#"
services:
  $$cap_appname:
    image: app
    environment:
      EXTRA: $$cap_extra
caproverOneClickApp:
  variables:
    - id: $$cap_extra
      label: Extra flags
      defaultValue: ''
"#;
        let resolver = VariableResolver::new("example.com");

        let defaulted = resolver.resolve(raw, &instance(), &BTreeMap::new()).unwrap();
        assert_eq!(defaulted.declared[0].id, "$$cap_extra");
        assert!(defaulted.document.contains("EXTRA: \n"));

        let supplied = resolver
            .resolve(raw, &instance(), &vars(&[("extra", "")]))
            .unwrap();
        assert_eq!(supplied.declared[0].id, "$$cap_extra");
    }

    #[test]
    fn value_failing_valid_regex_is_rejected() {
        let raw = r#"
services:
  $$cap_appname:
    image: app
caproverOneClickApp:
  variables:
    - id: $$cap_port
      label: Port
      validRegex: /^\d+$/
"#;
        let resolver = VariableResolver::new("example.com");

        let err = resolver
            .resolve(raw, &instance(), &vars(&[("port", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, DeployError::InvalidVariable { ref id, .. } if id == "$$cap_port"));

        assert!(resolver
            .resolve(raw, &instance(), &vars(&[("port", "8080")]))
            .is_ok());
    }
}
