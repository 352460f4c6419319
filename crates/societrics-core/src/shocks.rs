//! Shock Registry
//!
//! Catalog of external perturbations. A shock applies its `effects` once at
//! activation and its `ongoing_effects` on every later step until reset.

use serde::{Deserialize, Serialize};
use societrics_events::{Field, FieldMap};

use crate::field_map;

/// One external shock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShockDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// One-time multipliers, clamped to each field's domain
    #[serde(default)]
    pub effects: FieldMap,
    /// Per-step multipliers while the shock is active
    #[serde(default)]
    pub ongoing_effects: FieldMap,
}

impl ShockDefinition {
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        effects: &[(Field, f64)],
        ongoing_effects: &[(Field, f64)],
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            effects: field_map(effects),
            ongoing_effects: field_map(ongoing_effects),
        }
    }
}

/// Read-only lookup over a list of shock definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ShockRegistry {
    shocks: Vec<ShockDefinition>,
}

impl ShockRegistry {
    pub fn new(shocks: Vec<ShockDefinition>) -> Self {
        Self { shocks }
    }

    pub fn get(&self, id: &str) -> Option<&ShockDefinition> {
        self.shocks.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.shocks.iter().map(|s| s.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShockDefinition> {
        self.shocks.iter()
    }

    pub fn len(&self) -> usize {
        self.shocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shocks.is_empty()
    }
}

impl Default for ShockRegistry {
    fn default() -> Self {
        Self::new(default_shocks())
    }
}

/// The built-in catalog of six shocks.
pub fn default_shocks() -> Vec<ShockDefinition> {
    use Field::*;

    vec![
        ShockDefinition::new(
            "sanctions",
            "International Sanctions",
            "Economic isolation from global markets",
            &[(Wealth, 0.85), (Soc, 0.90), (SocialPressure, 1.15), (TimeSense, 0.95)],
            &[(Wealth, 0.999)],
        ),
        ShockDefinition::new(
            "oil",
            "Commodity Price Collapse",
            "Major export revenue collapse",
            &[(Wealth, 0.70), (PoliticalPower, 0.85), (PersonalAgency, 0.90)],
            &[(Wealth, 0.998)],
        ),
        ShockDefinition::new(
            "aid",
            "Humanitarian Aid Influx",
            "International assistance arrives",
            &[
                (Wealth, 1.10),
                (Trust, 1.05),
                (PopulationExitRate, 0.95),
                (PersonalAgency, 1.05),
            ],
            &[(Wealth, 1.001), (Trust, 1.0005)],
        ),
        ShockDefinition::new(
            "migration",
            "Mass Emigration Wave",
            "Brain drain and population flight",
            &[
                (PersonalAgency, 0.80),
                (PopulationExitRate, 1.30),
                (Trust, 0.90),
                (Education, 0.95),
            ],
            &[(PopulationExitRate, 1.005), (PersonalAgency, 0.999)],
        ),
        ShockDefinition::new(
            "intervention",
            "Foreign Military Intervention",
            "External armed intervention",
            &[
                (RegimeCoercion, 0.60),
                (SocialPressure, 0.75),
                (Rigidity, 1.20),
                (Civilization, 0.80),
            ],
            &[(Civilization, 0.998), (Trust, 0.999)],
        ),
        ShockDefinition::new(
            "cyber",
            "Information Warfare",
            "Disinformation and cyber attacks",
            &[
                (Trust, 0.85),
                (CulturalAnchoring, 0.90),
                (OppositionSymbolicCapital, 1.15),
            ],
            &[(Trust, 0.999), (CulturalAnchoring, 0.9995)],
        ),
    ]
}
