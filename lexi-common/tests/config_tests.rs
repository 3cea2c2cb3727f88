//! Configuration resolution tests
//!
//! Uses serial_test because the resolvers read process environment
//! variables (`LEXI_ROOT_FOLDER`, `LEXI_CONFIG`).

use lexi_common::config::{
    config_file_path, default_root_folder, resolve_root_folder, TomlConfig, CONFIG_PATH_ENV,
    ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_argument_wins_over_everything() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/from-env");
    let toml_config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/from-toml")),
        ..Default::default()
    };

    let root = resolve_root_folder(Some(Path::new("/tmp/from-cli")), &toml_config);
    assert_eq!(root, PathBuf::from("/tmp/from-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_env_wins_over_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/from-env");
    let toml_config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/from-toml")),
        ..Default::default()
    };

    let root = resolve_root_folder(None, &toml_config);
    assert_eq!(root, PathBuf::from("/tmp/from-env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_toml_then_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let toml_config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/from-toml")),
        ..Default::default()
    };
    assert_eq!(
        resolve_root_folder(None, &toml_config),
        PathBuf::from("/tmp/from-toml")
    );

    assert_eq!(
        resolve_root_folder(None, &TomlConfig::default()),
        default_root_folder()
    );
}

#[test]
#[serial]
fn test_config_path_from_env() {
    env::set_var(CONFIG_PATH_ENV, "/tmp/lexi-test.toml");
    assert_eq!(
        config_file_path(None),
        Some(PathBuf::from("/tmp/lexi-test.toml"))
    );
    env::remove_var(CONFIG_PATH_ENV);

    assert_eq!(
        config_file_path(Some(Path::new("/tmp/cli.toml"))),
        Some(PathBuf::from("/tmp/cli.toml"))
    );
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = TomlConfig::load(&temp_dir.path().join("absent.toml")).unwrap();

    assert!(config.sources.is_empty());
    assert_eq!(config.enrichment.staleness_days, 90);
}

#[test]
fn test_invalid_config_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "[enrichment\nstaleness_days = ").unwrap();

    assert!(TomlConfig::load(&path).is_err());
}

#[test]
fn test_load_full_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lexi-enrich.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/lexi"
bind_address = "0.0.0.0:8080"

[logging]
level = "debug"

[enrichment]
staleness_days = 45
source_timeout_secs = 5

[[sources]]
name = "Oxford"
url_template = "https://dictionary.local/oxford/{word}"
facets = ["transcription"]
"#,
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/lexi")));
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0:8080"));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.enrichment.staleness_days, 45);
    assert_eq!(config.enrichment.max_lock_wait_ms, 5000);
    assert_eq!(config.sources[0].facets, vec!["transcription".to_string()]);
}
