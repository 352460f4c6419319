//! Configuration loading for the analyst.
//!
//! Analyzer thresholds are loaded from a TOML configuration file.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::equilibrium::AnalyzerConfig;

/// Complete analyst configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalystConfig {
    /// Equilibrium analyzer thresholds
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

impl AnalystConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: AnalystConfig = toml::from_str(content)?;
        if config.analyzer.moral_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "moral_tolerance must not be negative, got {}",
                config.analyzer.moral_tolerance
            )));
        }
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Analyst Configuration

[analyzer]
# Moral condition: |W_acc - moral_target| <= moral_tolerance
moral_target = 1.0
moral_tolerance = 0.5
# Strategic condition: best alternative payoff beats the myopic favorite by more than this
payoff_margin = 1.0
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalystConfig::default();
        assert_eq!(config.analyzer.moral_target, 1.0);
        assert_eq!(config.analyzer.moral_tolerance, 0.5);
        assert_eq!(config.analyzer.payoff_margin, 1.0);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [analyzer]
            payoff_margin = 2.5
        "#;

        let config = AnalystConfig::from_str(toml).unwrap();

        // Specified value
        assert_eq!(config.analyzer.payoff_margin, 2.5);
        // Default values
        assert_eq!(config.analyzer.moral_target, 1.0);
        assert_eq!(config.analyzer.moral_tolerance, 0.5);
    }

    #[test]
    fn test_empty_config() {
        let config = AnalystConfig::from_str("").unwrap();
        assert_eq!(config, AnalystConfig::default());
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let toml = "[analyzer]\nmoral_tolerance = -0.1\n";
        assert!(matches!(
            AnalystConfig::from_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_config_to_toml() {
        let toml = AnalystConfig::default().to_toml().unwrap();
        assert!(toml.contains("[analyzer]"));
        assert_eq!(AnalystConfig::from_str(&toml).unwrap(), AnalystConfig::default());
    }

    #[test]
    fn test_default_config_toml_parses() {
        let config = AnalystConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, AnalystConfig::default());
    }
}
