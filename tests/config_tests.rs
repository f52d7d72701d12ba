//! Configuration loading from TOML files.

use std::io::Write;

use rigger::error::{ConfigError, Error};
use rigger::infrastructure::config::logging::LogFormat;
use rigger::infrastructure::config::settings::Config;
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"
[platform]
url = "https://captain.example.com/"
namespace = "captain"
timeout_ms = 10000
connect_timeout_ms = 2000

[manifests]
base_url = "https://manifests.example.com/v4/apps"
extension = "yaml"

[deploy]
retry_max_attempts = 5
retry_delay_ms = 500
build_poll_interval_ms = 1000
build_max_polls = 120
build_settle_ms = 1500
timeout_secs = 900

[logging]
level = "debug"
format = "json"
"#;

#[test]
fn full_document_is_parsed() {
    let config: Config = toml::from_str(FULL_CONFIG).unwrap();
    config.validate().unwrap();

    assert_eq!(config.platform.base_url(), "https://captain.example.com");
    assert_eq!(config.platform.timeout_ms, 10_000);
    assert_eq!(config.platform.connect_timeout_ms, 2_000);
    assert_eq!(config.manifests.extension, "yaml");
    assert!(config.manifests.directory.is_none());
    assert_eq!(config.deploy.retry_max_attempts, 5);
    assert_eq!(config.deploy.retry_delay().as_millis(), 500);
    assert_eq!(config.deploy.build_max_polls, 120);
    assert_eq!(config.deploy.settle_delay().as_millis(), 1_500);
    assert_eq!(config.deploy.timeout().map(|t| t.as_secs()), Some(900));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.deploy.retry_max_attempts, 3);
    assert_eq!(config.deploy.build_poll_interval_ms, 2_000);
    assert_eq!(config.deploy.timeout_secs, None);
    assert_eq!(config.platform.namespace, "captain");
}

#[test]
fn file_on_disk_is_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[deploy]\nbuild_max_polls = 42\n\n[manifests]\ndirectory = \"./manifests\"").unwrap();

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.deploy.build_max_polls, 42);
    assert_eq!(config.manifests.directory.as_deref(), Some("./manifests"));
}

#[test]
fn syntax_error_is_a_parse_error() {
    let result = Config::parse_toml("[deploy\nretry_max_attempts = 3");
    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn wrong_type_is_a_parse_error() {
    let result = Config::parse_toml("[deploy]\nretry_max_attempts = \"three\"\n");
    assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
}

#[test]
fn out_of_range_values_are_rejected() {
    let cases = [
        ("[deploy]\nretry_max_attempts = 0\n", "deploy.retry_max_attempts"),
        ("[deploy]\ntimeout_secs = 0\n", "deploy.timeout_secs"),
        ("[platform]\ntimeout_ms = 0\n", "platform.timeout_ms"),
    ];

    for (content, expected) in cases {
        let config: Config = toml::from_str(content).unwrap();
        match config.validate() {
            Err(Error::Config(ConfigError::InvalidValue { field, .. })) => {
                assert_eq!(field, expected, "for {content:?}");
            }
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }
}

#[test]
fn blank_namespace_is_missing() {
    let config: Config = toml::from_str("[platform]\nnamespace = \"  \"\n").unwrap();
    assert!(matches!(
        config.validate(),
        Err(Error::Config(ConfigError::MissingField {
            field: "platform.namespace"
        }))
    ));
}

#[test]
fn rendered_config_parses_back() {
    let config: Config = toml::from_str(FULL_CONFIG).unwrap();
    let rendered = config.to_toml().unwrap();

    let reparsed: Config = toml::from_str(&rendered).unwrap();

    assert_eq!(reparsed.deploy.build_max_polls, 120);
    assert_eq!(reparsed.manifests.extension, "yaml");
    assert_eq!(reparsed.logging.format, LogFormat::Json);
}
