//! Configuration loading for CLI commands

use anyhow::{Context, Result};
use explorer_core::config::{parse_validity_mode, CliConfigOverrides, LayeredConfig};
use explorer_core::models::TimelinePeriod;
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Config file picked up from the working directory when --config is not given
pub const DEFAULT_CONFIG_FILE: &str = "explorer.toml";

/// Load layered configuration: defaults, then file, then environment, then CLI flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    if let Some(path) = config_path(cli.config.as_deref()) {
        tracing::debug!(path = %path.display(), "Loading configuration file");
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
    }

    let mut config = config.load_from_env();
    config.update_from_cli(cli_overrides(cli)?);
    Ok(config)
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        }
    }
}

fn cli_overrides(cli: &Cli) -> Result<CliConfigOverrides> {
    Ok(CliConfigOverrides {
        target_srid: cli.target_srid,
        geometry_validity: cli.validity_mode.as_deref().map(parse_validity_mode).transpose()?,
        product_timeline_period: cli
            .timeline_period
            .as_deref()
            .map(str::parse::<TimelinePeriod>)
            .transpose()?,
        index_timeout_secs: cli.index_timeout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use explorer_core::config::ConfigSource;
    use explorer_core::models::ValidityMode;

    #[test]
    fn test_cli_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explorer.toml");
        std::fs::write(&path, "target_srid = 3577\ngeometry_validity = \"Strict\"\n").unwrap();

        let cli = Cli::parse_from([
            "explorer-gen",
            "--config",
            path.to_str().unwrap(),
            "--target-srid",
            "4326",
            "config",
        ]);
        let config = load_config(&cli).unwrap();

        assert_eq!(config.target_srid.value, 4326);
        assert_eq!(config.target_srid.source, ConfigSource::Cli);
        assert_eq!(config.geometry_validity.value, ValidityMode::Strict);
        assert_eq!(config.geometry_validity.source, ConfigSource::File);
    }

    #[test]
    fn test_invalid_flag_value_is_rejected() {
        let cli = Cli::parse_from(["explorer-gen", "--timeline-period", "week", "config"]);
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let cli = Cli::parse_from(["explorer-gen", "--config", "/nonexistent/explorer.toml", "config"]);
        assert!(load_config(&cli).is_err());
    }
}
