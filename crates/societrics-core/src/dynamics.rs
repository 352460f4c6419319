//! Natural Dynamics
//!
//! Per-step drift applied when no intervention governs a field, and the
//! projections that recompute derived fields from the fresh state.

use serde::{Deserialize, Serialize};
use societrics_events::{Field, StateVector};

use crate::indices::WsiWeights;
use crate::phases::PhaseDefinition;

/// One natural-decay rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecayRule {
    /// field ×= factor
    Scale { field: Field, factor: f64 },
    /// field += amount
    Add { field: Field, amount: f64 },
    /// field += factor × source
    AddScaled {
        field: Field,
        source: Field,
        factor: f64,
    },
}

impl DecayRule {
    pub fn field(&self) -> Field {
        match *self {
            DecayRule::Scale { field, .. }
            | DecayRule::Add { field, .. }
            | DecayRule::AddScaled { field, .. } => field,
        }
    }

    pub fn apply(&self, state: &mut StateVector) {
        match *self {
            DecayRule::Scale { field, factor } => *state.get_mut(field) *= factor,
            DecayRule::Add { field, amount } => *state.get_mut(field) += amount,
            DecayRule::AddScaled {
                field,
                source,
                factor,
            } => {
                let delta = factor * state.get(source);
                *state.get_mut(field) += delta;
            }
        }
    }
}

/// What happens to fields an active phase does not govern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncoveredFieldPolicy {
    /// Natural decay keeps running on them
    #[default]
    Decay,
    /// They hold their value
    Freeze,
}

/// Input of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionSource {
    Wsi,
    Field(Field),
}

/// `target = intercept + slope × source / reference`, recomputed every step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub target: Field,
    pub source: ProjectionSource,
    pub intercept: f64,
    pub slope: f64,
    #[serde(default = "default_reference")]
    pub reference: f64,
}

fn default_reference() -> f64 {
    1.0
}

impl Projection {
    pub fn value(&self, state: &StateVector, weights: &WsiWeights) -> f64 {
        let source = match self.source {
            ProjectionSource::Wsi => weights.wsi(state),
            ProjectionSource::Field(field) => state.get(field),
        };
        self.intercept + self.slope * source / self.reference
    }
}

/// Step dynamics settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsConfig {
    pub uncovered_fields: UncoveredFieldPolicy,
    pub natural_decay: Vec<DecayRule>,
    /// Applied in order after clamping; an empty list disables projections
    pub projections: Vec<Projection>,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            uncovered_fields: UncoveredFieldPolicy::default(),
            natural_decay: default_natural_decay(),
            projections: default_projections(),
        }
    }
}

impl DynamicsConfig {
    /// Runs natural decay and, when a phase is active, its recovery rates.
    ///
    /// Values are left unclamped.
    pub fn evolve(&self, state: &mut StateVector, phase: Option<&PhaseDefinition>) {
        match phase {
            None => {
                for rule in &self.natural_decay {
                    rule.apply(state);
                }
            }
            Some(definition) => {
                if self.uncovered_fields == UncoveredFieldPolicy::Decay {
                    for rule in &self.natural_decay {
                        if !definition.governs(rule.field()) {
                            rule.apply(state);
                        }
                    }
                }
                definition.apply_recovery(state);
            }
        }
    }

    /// Recomputes each projected field from the current state.
    pub fn project(&self, state: &mut StateVector, weights: &WsiWeights) {
        for projection in &self.projections {
            let value = projection.value(state, weights);
            state.set(projection.target, value);
        }
    }
}

pub fn default_natural_decay() -> Vec<DecayRule> {
    use Field::*;

    vec![
        DecayRule::Scale { field: Trust, factor: 0.985 },
        DecayRule::Scale { field: Wealth, factor: 0.975 },
        DecayRule::Scale { field: Education, factor: 0.990 },
        DecayRule::Scale { field: Soc, factor: 0.985 },
        DecayRule::AddScaled {
            field: SocialPressure,
            source: RegimeCoercion,
            factor: 0.005,
        },
        DecayRule::Add { field: Rigidity, amount: 0.003 },
        DecayRule::Add { field: PopulationExitRate, amount: 0.01 },
        DecayRule::Scale { field: PoliticalPower, factor: 0.990 },
        DecayRule::Scale { field: TimeSense, factor: 0.995 },
        DecayRule::Scale { field: PersonalAgency, factor: 0.990 },
        DecayRule::Scale { field: CulturalAnchoring, factor: 0.995 },
    ]
}

/// T follows WSI and C follows trust.
pub fn default_projections() -> Vec<Projection> {
    vec![
        Projection {
            target: Field::TimeSense,
            source: ProjectionSource::Wsi,
            intercept: 0.3,
            slope: 0.7,
            reference: 0.75,
        },
        Projection {
            target: Field::CulturalAnchoring,
            source: ProjectionSource::Field(Field::Trust),
            intercept: 0.2,
            slope: 0.8,
            reference: 1.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::PhaseTable;
    use societrics_events::InterventionPhase;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_natural_decay_without_phase() {
        let config = DynamicsConfig::default();
        let mut state = StateVector::default();
        let before = state;

        config.evolve(&mut state, None);

        assert!((state.trust - before.trust * 0.985).abs() < EPS);
        assert!((state.wealth - before.wealth * 0.975).abs() < EPS);
        assert!(
            (state.social_pressure - (before.social_pressure + 0.005 * before.regime_coercion))
                .abs()
                < EPS
        );
        assert!((state.rigidity - (before.rigidity + 0.003)).abs() < EPS);
        assert!((state.population_exit_rate - (before.population_exit_rate + 0.01)).abs() < EPS);
        // Actor scalars other than exit do not drift
        assert_eq!(state.regime_coercion, before.regime_coercion);
    }

    #[test]
    fn test_uncovered_fields_decay_by_default() {
        let config = DynamicsConfig::default();
        let table = PhaseTable::default();
        let phase = table.get(InterventionPhase::StructuralFloor);
        let mut state = StateVector::default();
        let before = state;

        config.evolve(&mut state, phase);

        // Governed: recovery instead of decay
        assert!((state.wealth - before.wealth * 1.01).abs() < EPS);
        assert!((state.soc - before.soc * 1.015).abs() < EPS);
        // Uncovered: natural decay continues
        assert!((state.trust - before.trust * 0.985).abs() < EPS);
        assert!((state.education - before.education * 0.990).abs() < EPS);
    }

    #[test]
    fn test_uncovered_fields_freeze() {
        let config = DynamicsConfig {
            uncovered_fields: UncoveredFieldPolicy::Freeze,
            ..DynamicsConfig::default()
        };
        let table = PhaseTable::default();
        let phase = table.get(InterventionPhase::StructuralFloor);
        let mut state = StateVector::default();
        let before = state;

        config.evolve(&mut state, phase);

        assert!((state.wealth - before.wealth * 1.01).abs() < EPS);
        assert_eq!(state.trust, before.trust);
        assert_eq!(state.education, before.education);
        assert_eq!(state.rigidity, before.rigidity);
    }

    #[test]
    fn test_default_projections() {
        let config = DynamicsConfig::default();
        let weights = WsiWeights::balanced();
        let mut state = StateVector::default();
        let wsi = weights.wsi(&state);

        config.project(&mut state, &weights);

        assert!((state.time_sense - (0.3 + 0.7 * wsi / 0.75)).abs() < EPS);
        assert!((state.cultural_anchoring - (0.2 + 0.8 * state.trust)).abs() < EPS);
    }

    #[test]
    fn test_projections_can_be_disabled() {
        let config = DynamicsConfig {
            projections: Vec::new(),
            ..DynamicsConfig::default()
        };
        let mut state = StateVector::default();
        let before = state;
        config.project(&mut state, &WsiWeights::balanced());
        assert_eq!(state, before);
    }

    #[test]
    fn test_decay_rule_serialization() {
        let rule = DecayRule::AddScaled {
            field: Field::SocialPressure,
            source: Field::RegimeCoercion,
            factor: 0.005,
        };
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains(r#""kind":"add_scaled""#));
        assert!(json.contains(r#""field":"social_pressure""#));
    }
}
