//! Tests for bridge configuration loading

use dib_runtime::{BridgeConfig, BridgeError, ConfigLoader, LoggingConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// Prefix no test environment sets, so only defaults and files apply
const ISOLATED_PREFIX: &str = "DIB_CONFIG_TEST_UNSET";

fn loader(path: &std::path::Path) -> ConfigLoader {
    ConfigLoader::new()
        .with_config_path(path)
        .with_env_prefix(ISOLATED_PREFIX)
}

#[test]
fn test_missing_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let config = loader(&temp.path().join("dib.toml")).load().unwrap();
    assert_eq!(config, BridgeConfig::default());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_file_overrides_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dib.toml");
    fs::write(
        &path,
        r#"
artifacts = ["target/app.dib.json"]
active_environments = ["test"]

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = loader(&path).load().unwrap();

    assert_eq!(config.artifacts, [PathBuf::from("target/app.dib.json")]);
    assert_eq!(config.active_environments, ["test"]);
    assert_eq!(config.logging.level, "debug");
    assert!(!config.logging.json_format);
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dib.toml");
    fs::write(&path, "[logging]\nlevel = \"loud\"\n").unwrap();

    let err = loader(&path).load().unwrap_err();
    assert!(matches!(err, BridgeError::Configuration { .. }));
    assert!(err.to_string().contains("Invalid log level: loud"));
}

#[test]
fn test_malformed_file_is_named_in_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dib.toml");
    fs::write(&path, "artifacts = 5\n").unwrap();

    let err = loader(&path).load().unwrap_err();
    assert!(matches!(err, BridgeError::Configuration { .. }));
    assert!(
        err.to_string()
            .contains(&format!("Failed to extract bridge configuration from {}", path.display()))
    );
}

#[test]
fn test_saved_config_loads_back() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dib.toml");
    let config = BridgeConfig {
        logging: LoggingConfig {
            level: "warn".into(),
            json_format: true,
        },
        ..BridgeConfig::default()
            .with_artifact("a.dib.json")
            .with_environment("prod")
    };

    let loader = loader(&path);
    loader.save_to_file(&config, &path).unwrap();

    assert_eq!(loader.load().unwrap(), config);
    assert_eq!(loader.config_path(), Some(path.as_path()));
}
