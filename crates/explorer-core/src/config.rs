use crate::error::{ExplorerError, Result};
use crate::models::{TimelinePeriod, ValidityMode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for summary generation
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub target_srid: ConfigValue<u32>,
    pub geometry_validity: ConfigValue<ValidityMode>,
    pub product_timeline_period: ConfigValue<TimelinePeriod>,
    pub index_timeout_secs: ConfigValue<u64>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            target_srid: ConfigValue::new(4326, ConfigSource::Default),
            geometry_validity: ConfigValue::new(ValidityMode::Lenient, ConfigSource::Default),
            product_timeline_period: ConfigValue::new(
                TimelinePeriod::Month,
                ConfigSource::Default,
            ),
            index_timeout_secs: ConfigValue::new(300, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ExplorerError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| ExplorerError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(srid) = file_config.target_srid {
            self.target_srid.update(srid, ConfigSource::File);
        }

        if let Some(validity) = file_config.geometry_validity {
            self.geometry_validity.update(validity, ConfigSource::File);
        }

        if let Some(period) = file_config.product_timeline_period {
            self.product_timeline_period.update(period, ConfigSource::File);
        }

        if let Some(timeout) = file_config.index_timeout_secs {
            self.index_timeout_secs.update(timeout, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // EXPLORER_TARGET_SRID
        if let Ok(srid_str) = env::var("EXPLORER_TARGET_SRID") {
            match srid_str.parse::<u32>() {
                Ok(srid) => self.target_srid.update(srid, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid EXPLORER_TARGET_SRID value '{}': expected integer SRID",
                    srid_str
                ),
            }
        }

        // EXPLORER_GEOMETRY_VALIDITY
        if let Ok(validity_str) = env::var("EXPLORER_GEOMETRY_VALIDITY") {
            match parse_validity_mode(&validity_str) {
                Ok(validity) => self.geometry_validity.update(validity, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid EXPLORER_GEOMETRY_VALIDITY value '{}': expected strict or lenient",
                    validity_str
                ),
            }
        }

        // EXPLORER_TIMELINE_PERIOD
        if let Ok(period_str) = env::var("EXPLORER_TIMELINE_PERIOD") {
            match period_str.parse::<TimelinePeriod>() {
                Ok(period) => {
                    self.product_timeline_period.update(period, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid EXPLORER_TIMELINE_PERIOD value '{}': expected day, month, or year",
                    period_str
                ),
            }
        }

        // EXPLORER_INDEX_TIMEOUT
        if let Ok(timeout_str) = env::var("EXPLORER_INDEX_TIMEOUT") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => self.index_timeout_secs.update(timeout, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid EXPLORER_INDEX_TIMEOUT value '{}': expected seconds",
                    timeout_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(srid) = overrides.target_srid {
            self.target_srid.update(srid, ConfigSource::Cli);
        }

        if let Some(validity) = overrides.geometry_validity {
            self.geometry_validity.update(validity, ConfigSource::Cli);
        }

        if let Some(period) = overrides.product_timeline_period {
            self.product_timeline_period.update(period, ConfigSource::Cli);
        }

        if let Some(timeout) = overrides.index_timeout_secs {
            self.index_timeout_secs.update(timeout, ConfigSource::Cli);
        }
    }

    /// Resolved settings for the summary store
    pub fn summary_settings(&self) -> SummarySettings {
        SummarySettings {
            target_srid: self.target_srid.value,
            geometry_validity: self.geometry_validity.value,
            product_timeline_period: self.product_timeline_period.value,
            index_timeout: Duration::from_secs(self.index_timeout_secs.value),
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "target_srid".to_string(),
            (format!("EPSG:{}", self.target_srid.value), self.target_srid.source),
        );

        map.insert(
            "geometry_validity".to_string(),
            (format!("{:?}", self.geometry_validity.value), self.geometry_validity.source),
        );

        map.insert(
            "product_timeline_period".to_string(),
            (
                self.product_timeline_period.value.to_string(),
                self.product_timeline_period.source,
            ),
        );

        map.insert(
            "index_timeout_secs".to_string(),
            (self.index_timeout_secs.value.to_string(), self.index_timeout_secs.source),
        );

        map
    }
}

/// Plain settings consumed by the summary store
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySettings {
    pub target_srid: u32,
    pub geometry_validity: ValidityMode,
    pub product_timeline_period: TimelinePeriod,
    pub index_timeout: Duration,
}

impl Default for SummarySettings {
    fn default() -> Self {
        LayeredConfig::with_defaults().summary_settings()
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    target_srid: Option<u32>,
    geometry_validity: Option<ValidityMode>,
    product_timeline_period: Option<TimelinePeriod>,
    index_timeout_secs: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub target_srid: Option<u32>,
    pub geometry_validity: Option<ValidityMode>,
    pub product_timeline_period: Option<TimelinePeriod>,
    pub index_timeout_secs: Option<u64>,
}

/// Parse validity mode from string
pub fn parse_validity_mode(s: &str) -> Result<ValidityMode> {
    match s.to_lowercase().as_str() {
        "strict" => Ok(ValidityMode::Strict),
        "lenient" => Ok(ValidityMode::Lenient),
        _ => Err(ExplorerError::ConfigInvalid {
            key: "geometry_validity".to_string(),
            reason: format!("Invalid validity mode: {}. Use strict or lenient", s),
        }),
    }
}
