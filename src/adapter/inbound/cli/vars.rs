//! `--var KEY=VALUE` parsing.

use std::collections::BTreeMap;

use crate::error::{ConfigError, Result};

/// Collect `KEY=VALUE` pairs. Later occurrences of a key win.
///
/// Only the first `=` separates key from value, so values may contain `=`.
pub fn parse_vars(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut vars = BTreeMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(ConfigError::InvalidValue {
                field: "var",
                reason: format!("expected KEY=VALUE, got '{pair}'"),
            }
            .into());
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "var",
                reason: format!("missing key in '{pair}'"),
            }
            .into());
        }
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn splits_on_first_equals() {
        let vars = parse_vars(&strings(&["dsn=postgres://u:p@h/db?x=1"])).unwrap();
        assert_eq!(vars["dsn"], "postgres://u:p@h/db?x=1");
    }

    #[test]
    fn empty_value_is_allowed_and_last_wins() {
        let vars = parse_vars(&strings(&["a=1", "b=", "a=2"])).unwrap();
        assert_eq!(vars["a"], "2");
        assert_eq!(vars["b"], "");
    }

    #[test]
    fn malformed_pairs_are_rejected() {
        assert!(parse_vars(&strings(&["novalue"])).is_err());
        assert!(parse_vars(&strings(&["=value"])).is_err());
    }
}
