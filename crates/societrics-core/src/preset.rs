//! Presets
//!
//! A named starting state. Presets are plain data; the country libraries the
//! dashboards ship live outside the engine and load through TOML.

use serde::{Deserialize, Serialize};
use societrics_events::StateVector;
use std::path::Path;

use crate::config::{read_file, ConfigError};
use crate::error::EngineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub state: StateVector,
}

impl Preset {
    pub fn new(id: &str, name: &str, state: StateVector) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            state,
        }
    }

    /// Mid-range starting point for building a scenario by hand.
    pub fn custom() -> Self {
        Self {
            description: "Build your own crisis parameters".to_string(),
            ..Self::new("custom", "Custom Scenario", StateVector::default())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = read_file(path)?;
        Self::from_str(&content)
    }

    /// Parses a preset. Domain checks happen when a scenario is built from it.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Rejects non-finite or out-of-range fields.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.state.validate()?;
        Ok(())
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::custom()
    }
}
