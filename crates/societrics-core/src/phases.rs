//! Intervention Phases
//!
//! The three ordered policy interventions. Each carries a one-time effect
//! applied when the phase starts and per-step recovery rates applied while
//! it stays active.

use serde::{Deserialize, Serialize};
use societrics_events::{Field, FieldMap, InterventionPhase, StateVector};

use crate::field_map;

/// Definition of one intervention phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub phase: InterventionPhase,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// One-time multipliers, clamped at activation
    #[serde(default)]
    pub effects: FieldMap,
    /// Per-step multipliers while the phase is active
    #[serde(default)]
    pub recovery_rates: FieldMap,
    /// Lower bounds for fields whose recovery rate shrinks them
    #[serde(default)]
    pub recovery_floors: FieldMap,
}

impl PhaseDefinition {
    /// Whether this phase's recovery rates govern `field`.
    pub fn governs(&self, field: Field) -> bool {
        self.recovery_rates.contains_key(&field)
    }

    /// Multiplies governed fields by their recovery rate. No clamping.
    pub fn apply_recovery(&self, state: &mut StateVector) {
        for (&field, &rate) in &self.recovery_rates {
            let mut value = state.get(field) * rate;
            if rate < 1.0 {
                if let Some(&floor) = self.recovery_floors.get(&field) {
                    value = value.max(floor);
                }
            }
            state.set(field, value);
        }
    }
}

/// Lookup of phase definitions by phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTable {
    phases: Vec<PhaseDefinition>,
}

impl PhaseTable {
    pub fn new(phases: Vec<PhaseDefinition>) -> Self {
        Self { phases }
    }

    pub fn get(&self, phase: InterventionPhase) -> Option<&PhaseDefinition> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    /// Phases missing a definition.
    pub fn missing(&self) -> Vec<InterventionPhase> {
        InterventionPhase::ALL
            .into_iter()
            .filter(|phase| self.get(*phase).is_none())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhaseDefinition> {
        self.phases.iter()
    }
}

impl Default for PhaseTable {
    fn default() -> Self {
        Self::new(default_phases())
    }
}

/// The built-in three-phase sequence.
pub fn default_phases() -> Vec<PhaseDefinition> {
    use Field::*;

    vec![
        PhaseDefinition {
            phase: InterventionPhase::CircuitBreaker,
            name: "Circuit Breaker".to_string(),
            description: "Reduce coercion and social pressure to stop feedback loops".to_string(),
            effects: field_map(&[
                (RegimeCoercion, 0.7),
                (SocialPressure, 0.85),
                (Rigidity, 0.90),
                (OppositionSymbolicCapital, 1.2),
            ]),
            recovery_rates: field_map(&[(SocialPressure, 0.97), (Rigidity, 0.98), (Trust, 1.005)]),
            recovery_floors: field_map(&[(SocialPressure, 0.40), (Rigidity, 0.40)]),
        },
        PhaseDefinition {
            phase: InterventionPhase::StructuralFloor,
            name: "Structural Floor".to_string(),
            description: "Stabilize institutions and expand system capacity".to_string(),
            effects: field_map(&[
                (PoliticalPower, 0.80),
                (Wealth, 1.15),
                (Soc, 1.3),
                (RegimeStructuralControl, 0.70),
            ]),
            recovery_rates: field_map(&[(Wealth, 1.01), (Soc, 1.015), (Civilization, 1.005)]),
            recovery_floors: FieldMap::new(),
        },
        PhaseDefinition {
            phase: InterventionPhase::IncentiveEngine,
            name: "Incentive Engine".to_string(),
            description: "Empower individual agency and rebuild trust".to_string(),
            effects: field_map(&[
                (PersonalAgency, 1.4),
                (Wealth, 1.25),
                (PopulationExitRate, 0.70),
                (Trust, 1.3),
            ]),
            recovery_rates: field_map(&[
                (PersonalAgency, 1.02),
                (Trust, 1.015),
                (Wealth, 1.02),
                (PopulationExitRate, 0.95),
            ]),
            recovery_floors: FieldMap::new(),
        },
    ]
}
