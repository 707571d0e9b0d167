//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use explorer_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig, SummarySettings};
use explorer_core::models::{TimelinePeriod, ValidityMode};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::time::Duration;
use tempfile::{NamedTempFile, TempDir};

const ENV_KEYS: [&str; 4] = [
    "EXPLORER_TARGET_SRID",
    "EXPLORER_GEOMETRY_VALIDITY",
    "EXPLORER_TIMELINE_PERIOD",
    "EXPLORER_INDEX_TIMEOUT",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", content).unwrap();
    file
}

#[test]
fn test_default_settings() {
    let settings = SummarySettings::default();

    assert_eq!(settings.target_srid, 4326);
    assert_eq!(settings.geometry_validity, ValidityMode::Lenient);
    assert_eq!(settings.product_timeline_period, TimelinePeriod::Month);
    assert_eq!(settings.index_timeout, Duration::from_secs(300));
}

#[test]
fn test_partial_file_configuration() {
    let file = config_file(
        r#"
target_srid = 3577
# Only override the SRID, leave others as defaults
"#,
    );

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.target_srid.value, 3577);
    assert_eq!(config.target_srid.source, ConfigSource::File);
    assert_eq!(config.geometry_validity.source, ConfigSource::Default);
    assert_eq!(config.product_timeline_period.source, ConfigSource::Default);
    assert_eq!(config.index_timeout_secs.source, ConfigSource::Default);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();
    let file = config_file(
        r#"
target_srid = 3577
geometry_validity = "Strict"
"#,
    );

    env::set_var("EXPLORER_TARGET_SRID", "3857");
    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();
    clear_env();

    assert_eq!(config.target_srid.value, 3857);
    assert_eq!(config.target_srid.source, ConfigSource::Environment);
    // Not set in the environment, so the file value stays
    assert_eq!(config.geometry_validity.value, ValidityMode::Strict);
    assert_eq!(config.geometry_validity.source, ConfigSource::File);
}

#[test]
#[serial]
fn test_configuration_precedence_order() {
    clear_env();
    let file = config_file(
        r#"
target_srid = 3577
product_timeline_period = "day"
index_timeout_secs = 30
"#,
    );

    env::set_var("EXPLORER_TIMELINE_PERIOD", "year");
    env::set_var("EXPLORER_INDEX_TIMEOUT", "45");
    let mut config =
        LayeredConfig::with_defaults().load_from_file(file.path()).unwrap().load_from_env();
    clear_env();

    config.update_from_cli(CliConfigOverrides { index_timeout_secs: Some(5), ..Default::default() });

    assert_eq!(config.target_srid.source, ConfigSource::File);
    assert_eq!(config.product_timeline_period.value, TimelinePeriod::Year);
    assert_eq!(config.product_timeline_period.source, ConfigSource::Environment);
    assert_eq!(config.index_timeout_secs.value, 5);
    assert_eq!(config.index_timeout_secs.source, ConfigSource::Cli);

    let settings = config.summary_settings();
    assert_eq!(settings.target_srid, 3577);
    assert_eq!(settings.index_timeout, Duration::from_secs(5));
}

#[test]
fn test_invalid_toml_file() {
    let file = config_file("target_srid = \"not a number\"");
    assert!(LayeredConfig::with_defaults().load_from_file(file.path()).is_err());
}

#[test]
fn test_unknown_timeline_period_in_file() {
    let file = config_file("product_timeline_period = \"week\"");
    assert!(LayeredConfig::with_defaults().load_from_file(file.path()).is_err());
}

#[test]
fn test_inspection_map_reports_sources() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("explorer.toml");
    std::fs::write(&path, "geometry_validity = \"Strict\"\n").unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(&path).unwrap();
    let map = config.to_inspection_map();

    assert_eq!(map.len(), 4);
    assert_eq!(map["target_srid"], ("EPSG:4326".to_string(), ConfigSource::Default));
    assert_eq!(map["geometry_validity"], ("Strict".to_string(), ConfigSource::File));
    assert_eq!(map["product_timeline_period"].0, "month");
}
