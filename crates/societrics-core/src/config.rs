//! Configuration System
//!
//! Loads engine settings from a TOML file so formulas, catalogs and dynamics
//! can be adjusted without recompiling. Every section is optional and falls
//! back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::dynamics::DynamicsConfig;
use crate::indices::{IndexCalculator, IndexConfig, PayoffConfig, WEIGHT_SUM_TOLERANCE};
use crate::phases::{default_phases, PhaseDefinition, PhaseTable};
use crate::shocks::{default_shocks, ShockDefinition, ShockRegistry};

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "societrics.toml";

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub indices: IndexConfig,
    pub payoffs: PayoffConfig,
    pub dynamics: DynamicsConfig,
    /// Shock catalog; replaces the built-in catalog when given
    pub shocks: Vec<ShockDefinition>,
    /// Phase table; must define all three phases when given
    pub phases: Vec<PhaseDefinition>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            indices: IndexConfig::default(),
            payoffs: PayoffConfig::default(),
            dynamics: DynamicsConfig::default(),
            shocks: default_shocks(),
            phases: default_phases(),
        }
    }
}

/// Run-length and playback settings used by the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Steps to run when no count is given
    pub default_steps: u64,
    /// Pause between steps in playback mode; 0 runs as fast as possible
    pub playback_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_steps: 150,
            playback_delay_ms: 0,
        }
    }
}

impl EngineConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = read_file(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let wsi_sum = self.indices.wsi_weights.sum();
        if (wsi_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::Invalid(format!(
                "WSI weights sum to {}, expected 1.0",
                wsi_sum
            )));
        }
        let tpc_sum = self.indices.tpc_weights.sum();
        if (tpc_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::Invalid(format!(
                "TPC weights sum to {}, expected 1.0",
                tpc_sum
            )));
        }
        let k = self.indices.signal_steepness;
        if !k.is_finite() || k <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "signal_steepness must be positive, got {}",
                k
            )));
        }

        let mut seen = HashSet::new();
        for shock in &self.shocks {
            if shock.id.is_empty() {
                return Err(ConfigError::Invalid("shock with empty id".to_string()));
            }
            if !seen.insert(shock.id.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate shock id {}", shock.id)));
            }
            check_multipliers(&shock.id, shock.effects.values())?;
            check_multipliers(&shock.id, shock.ongoing_effects.values())?;
        }

        let mut phases_seen = HashSet::new();
        for phase in &self.phases {
            if !phases_seen.insert(phase.phase) {
                return Err(ConfigError::Invalid(format!(
                    "phase {} defined more than once",
                    phase.phase
                )));
            }
            check_multipliers(phase.phase.id(), phase.effects.values())?;
            check_multipliers(phase.phase.id(), phase.recovery_rates.values())?;
        }
        if let Some(missing) = self.phase_table().missing().first() {
            return Err(ConfigError::Invalid(format!("missing phase definition {}", missing)));
        }

        for projection in &self.dynamics.projections {
            if !projection.reference.is_finite() || projection.reference <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "projection onto {} has non-positive reference",
                    projection.target
                )));
            }
        }
        Ok(())
    }

    pub fn shock_registry(&self) -> ShockRegistry {
        ShockRegistry::new(self.shocks.clone())
    }

    pub fn phase_table(&self) -> PhaseTable {
        PhaseTable::new(self.phases.clone())
    }

    pub fn calculator(&self) -> IndexCalculator {
        IndexCalculator::new(self.indices.clone(), self.payoffs.clone())
    }
}

fn check_multipliers<'a>(
    owner: &str,
    values: impl Iterator<Item = &'a f64>,
) -> Result<(), ConfigError> {
    for &value in values {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "{} has invalid multiplier {}",
                owner, value
            )));
        }
    }
    Ok(())
}

pub(crate) fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Errors that can occur while loading configuration, presets or plans.
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

/// Generates a commented configuration file with the default values.
pub fn default_config_toml() -> String {
    r#"# Societrics Engine Configuration

[simulation]
default_steps = 150
playback_delay_ms = 0

[indices]
# "multiplicative" or "additive"
capacity = "multiplicative"
# "one_sided" or "elastic_middle"
zones = "one_sided"
signal_steepness = 2.0

[indices.wsi_weights]
wealth = 0.20
trust = 0.20
religion = 0.10
civilization = 0.15
education = 0.20
political_power = 0.15

[indices.tpc_weights]
time_sense = 0.35
personal_agency = 0.35
cultural_anchoring = 0.30

[payoffs]
inversion_threshold = 0.0
# "whole_payoff": (base - strain cost) x phi
# "base_payoff": base x phi - strain cost
inversion_scope = "whole_payoff"

[payoffs.regime]
strain_penalty = 30.0
coefficients = { political_power = 10.0 }

[payoffs.opposition]
strain_penalty = 20.0
coefficients = { trust = 8.0, opposition_symbolic_capital = 5.0 }

[payoffs.population]
strain_penalty = 0.0
coefficients = { wealth = 5.0, education = 5.0, population_exit_rate = -10.0 }

[dynamics]
# "decay" keeps natural decay on fields the active phase does not govern,
# "freeze" holds them
uncovered_fields = "decay"

natural_decay = [
    { kind = "scale", field = "trust", factor = 0.985 },
    { kind = "scale", field = "wealth", factor = 0.975 },
    { kind = "scale", field = "education", factor = 0.990 },
    { kind = "scale", field = "soc", factor = 0.985 },
    { kind = "add_scaled", field = "social_pressure", source = "regime_coercion", factor = 0.005 },
    { kind = "add", field = "rigidity", amount = 0.003 },
    { kind = "add", field = "population_exit_rate", amount = 0.01 },
    { kind = "scale", field = "political_power", factor = 0.990 },
    { kind = "scale", field = "time_sense", factor = 0.995 },
    { kind = "scale", field = "personal_agency", factor = 0.990 },
    { kind = "scale", field = "cultural_anchoring", factor = 0.995 },
]

projections = [
    { target = "time_sense", source = "wsi", intercept = 0.3, slope = 0.7, reference = 0.75 },
    { target = "cultural_anchoring", source = { field = "trust" }, intercept = 0.2, slope = 0.8 },
]

[[shocks]]
id = "sanctions"
name = "International Sanctions"
description = "Economic isolation from global markets"
effects = { wealth = 0.85, soc = 0.90, social_pressure = 1.15, time_sense = 0.95 }
ongoing_effects = { wealth = 0.999 }

[[shocks]]
id = "oil"
name = "Commodity Price Collapse"
description = "Major export revenue collapse"
effects = { wealth = 0.70, political_power = 0.85, personal_agency = 0.90 }
ongoing_effects = { wealth = 0.998 }

[[shocks]]
id = "aid"
name = "Humanitarian Aid Influx"
description = "International assistance arrives"
effects = { wealth = 1.10, trust = 1.05, population_exit_rate = 0.95, personal_agency = 1.05 }
ongoing_effects = { wealth = 1.001, trust = 1.0005 }

[[shocks]]
id = "migration"
name = "Mass Emigration Wave"
description = "Brain drain and population flight"
effects = { personal_agency = 0.80, population_exit_rate = 1.30, trust = 0.90, education = 0.95 }
ongoing_effects = { population_exit_rate = 1.005, personal_agency = 0.999 }

[[shocks]]
id = "intervention"
name = "Foreign Military Intervention"
description = "External armed intervention"
effects = { regime_coercion = 0.60, social_pressure = 0.75, rigidity = 1.20, civilization = 0.80 }
ongoing_effects = { civilization = 0.998, trust = 0.999 }

[[shocks]]
id = "cyber"
name = "Information Warfare"
description = "Disinformation and cyber attacks"
effects = { trust = 0.85, cultural_anchoring = 0.90, opposition_symbolic_capital = 1.15 }
ongoing_effects = { trust = 0.999, cultural_anchoring = 0.9995 }

[[phases]]
phase = "circuit_breaker"
name = "Circuit Breaker"
description = "Reduce coercion and social pressure to stop feedback loops"
effects = { regime_coercion = 0.7, social_pressure = 0.85, rigidity = 0.90, opposition_symbolic_capital = 1.2 }
recovery_rates = { social_pressure = 0.97, rigidity = 0.98, trust = 1.005 }
recovery_floors = { social_pressure = 0.40, rigidity = 0.40 }

[[phases]]
phase = "structural_floor"
name = "Structural Floor"
description = "Stabilize institutions and expand system capacity"
effects = { political_power = 0.80, wealth = 1.15, soc = 1.3, regime_structural_control = 0.70 }
recovery_rates = { wealth = 1.01, soc = 1.015, civilization = 1.005 }

[[phases]]
phase = "incentive_engine"
name = "Incentive Engine"
description = "Empower individual agency and rebuild trust"
effects = { personal_agency = 1.4, wealth = 1.25, population_exit_rate = 0.70, trust = 1.3 }
recovery_rates = { personal_agency = 1.02, trust = 1.015, wealth = 1.02, population_exit_rate = 0.95 }
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::UncoveredFieldPolicy;
    use crate::indices::{CapacityScheme, InversionScope, WsiWeights, ZoneScheme};
    use societrics_events::{Field, InterventionPhase};
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.default_steps, 150);
        assert_eq!(config.shocks.len(), 6);
        assert_eq!(config.phases.len(), 3);
    }

    #[test]
    fn test_default_config_toml_matches_default() {
        let config = EngineConfig::from_str(&default_config_toml()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_parse_config_from_toml() {
        let toml = r#"
            [indices]
            capacity = "additive"
            zones = "elastic_middle"

            [indices.wsi_weights]
            wealth = 0.15
            trust = 0.20
            religion = 0.10
            civilization = 0.15
            education = 0.25
            political_power = 0.15

            [payoffs]
            inversion_scope = "base_payoff"

            [dynamics]
            uncovered_fields = "freeze"
        "#;

        let config = EngineConfig::from_str(toml).unwrap();

        assert_eq!(config.indices.capacity, CapacityScheme::Additive);
        assert_eq!(config.indices.zones, ZoneScheme::ElasticMiddle);
        assert_eq!(config.indices.wsi_weights, WsiWeights::education_weighted());
        assert_eq!(config.dynamics.uncovered_fields, UncoveredFieldPolicy::Freeze);
        assert_eq!(config.payoffs.inversion_scope, InversionScope::BasePayoff);
        assert_eq!(config.payoffs.regime, PayoffConfig::default().regime);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
            [simulation]
            default_steps = 40
        "#;

        let config = EngineConfig::from_str(toml).unwrap();

        // Specified value
        assert_eq!(config.simulation.default_steps, 40);
        // Default values
        assert_eq!(config.simulation.playback_delay_ms, 0);
        assert_eq!(config.indices, IndexConfig::default());
        assert_eq!(config.shocks.len(), 6);
        assert_eq!(config.dynamics.natural_decay.len(), 11);
    }

    #[test]
    fn test_config_to_toml_round_trip() {
        let config = EngineConfig::default();
        let toml = config.to_toml().unwrap();

        assert!(toml.contains("[simulation]"));
        assert!(toml.contains("sanctions"));

        let parsed = EngineConfig::from_str(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_weights_not_summing_to_one() {
        let toml = r#"
            [indices.wsi_weights]
            wealth = 0.5
            trust = 0.5
            religion = 0.5
            civilization = 0.0
            education = 0.0
            political_power = 0.0
        "#;
        let err = EngineConfig::from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("WSI weights"));
    }

    #[test]
    fn test_rejects_non_positive_steepness() {
        let mut config = EngineConfig::default();
        config.indices.signal_steepness = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_shock() {
        let mut config = EngineConfig::default();
        let duplicate = config.shocks[0].clone();
        config.shocks.push(duplicate);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate shock id sanctions"));
    }

    #[test]
    fn test_rejects_missing_phase() {
        let mut config = EngineConfig::default();
        config.phases.retain(|p| p.phase != InterventionPhase::StructuralFloor);

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("structural_floor"));
    }

    #[test]
    fn test_custom_shock_catalog_replaces_default() {
        let toml = r#"
            [[shocks]]
            id = "drought"
            name = "Drought"
            effects = { wealth = 0.9 }
        "#;
        let config = EngineConfig::from_str(toml).unwrap();
        let registry = config.shock_registry();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("drought").unwrap().effects.get(&Field::Wealth),
            Some(&0.9)
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[simulation]\nplayback_delay_ms = 300\n").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.simulation.playback_delay_ms, 300);
    }

    #[test]
    fn test_from_missing_file() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/societrics.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
