//! Configurator configuration.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use turbo_observability::{LogFormat, LogLevel, LogSink, StructuredLogger};

use crate::error::ConfiguratorError;
use crate::quantity::DEFAULT_DISPLAY_SCALE;

/// Top-level configuration. Every section and field has a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfiguratorConfig {
    /// SKU assignment.
    #[serde(default)]
    pub sku: SkuConfig,

    /// Variant generation.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// BOM resolution output.
    #[serde(default)]
    pub resolution: ResolutionConfig,

    /// Logger construction.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConfiguratorConfig {
    /// Load config from a TOML or JSON file (chosen by extension).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfiguratorError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfiguratorError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content).map_err(|e| {
                ConfiguratorError::Config(format!("failed to parse {}: {}", path.display(), e))
            })?
        } else {
            Self::from_toml_str(&content)?
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfiguratorError> {
        toml::from_str(content).map_err(|e| ConfiguratorError::Config(e.to_string()))
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfiguratorError> {
        toml::to_string_pretty(self).map_err(|e| ConfiguratorError::Config(e.to_string()))
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfiguratorError> {
        if !(3..=4).contains(&self.sku.abbreviation_len) {
            return Err(ConfiguratorError::Config(format!(
                "sku.abbreviation_len must be 3 or 4, got {}",
                self.sku.abbreviation_len
            )));
        }
        if self.sku.max_attempts == 0 {
            return Err(ConfiguratorError::Config(
                "sku.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.sku.separator.is_empty() {
            return Err(ConfiguratorError::Config(
                "sku.separator must not be empty".to_string(),
            ));
        }
        if self.resolution.display_scale > 10 {
            return Err(ConfiguratorError::Config(format!(
                "resolution.display_scale must be at most 10, got {}",
                self.resolution.display_scale
            )));
        }
        Ok(())
    }

    /// Build a logger for `component` writing to `sink`.
    pub fn logger(&self, sink: Arc<dyn LogSink>, component: &str) -> StructuredLogger {
        StructuredLogger::new(sink)
            .with_min_level(self.logging.level)
            .with_format(self.logging.format)
            .with_component(component)
    }
}

/// SKU assignment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuConfig {
    /// Separator between the prefix and each abbreviation.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Characters kept per option value (3 or 4).
    #[serde(default = "default_abbreviation_len")]
    pub abbreviation_len: usize,

    /// Numeric suffixes tried before giving up on a colliding SKU.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_separator() -> String {
    "-".to_string()
}

fn default_abbreviation_len() -> usize {
    3
}

fn default_max_attempts() -> u32 {
    100
}

impl Default for SkuConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            abbreviation_len: default_abbreviation_len(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Variant generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Reruns of the read-plan-insert step after losing a SKU race.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_max_retries() -> u32 {
    3
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

/// BOM output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Decimal places used when quantities are displayed or persisted.
    #[serde(default = "default_display_scale")]
    pub display_scale: u32,
}

fn default_display_scale() -> u32 {
    DEFAULT_DISPLAY_SCALE
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            display_scale: default_display_scale(),
        }
    }
}

/// Logger settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfiguratorConfig::default();
        assert_eq!(config.sku.separator, "-");
        assert_eq!(config.sku.abbreviation_len, 3);
        assert_eq!(config.generation.max_retries, 3);
        assert_eq!(config.resolution.display_scale, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ConfiguratorConfig::from_toml_str(
            r#"
            [sku]
            abbreviation_len = 4

            [logging]
            level = "debug"
            format = "human"
            "#,
        )
        .unwrap();

        assert_eq!(config.sku.abbreviation_len, 4);
        assert_eq!(config.sku.max_attempts, 100);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Human);
    }

    #[test]
    fn test_validate_rejects_bad_abbreviation_len() {
        let mut config = ConfiguratorConfig::default();
        config.sku.abbreviation_len = 6;
        assert!(matches!(
            config.validate(),
            Err(ConfiguratorError::Config(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ConfiguratorConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(ConfiguratorConfig::from_toml_str(&text).unwrap(), config);
    }
}
