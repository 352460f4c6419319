//! Index Calculator
//!
//! Pure functions deriving the composite indices from one state vector:
//! WSI, TPC score and modifier, effective capacity, the strain ratio theta,
//! the dual-pull balance, the signal-inversion multiplier, actor payoffs and
//! the equilibrium zone.
//!
//! Formulas that differ between dashboards (WSI weights, capacity, zones) are
//! named strategies selected in [`IndexConfig`]; they are never mixed.

use serde::{Deserialize, Serialize};
use societrics_events::{
    Actor, ActorPayoffs, DerivedMetrics, EquilibriumZone, Field, FieldMap, StateVector,
};

use crate::error::EngineError;

/// Tolerance for weight sets that must sum to 1.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights of the six fundamentals in the Weight Shift Index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WsiWeights {
    pub wealth: f64,
    pub trust: f64,
    pub religion: f64,
    pub civilization: f64,
    pub education: f64,
    pub political_power: f64,
}

impl WsiWeights {
    pub fn balanced() -> Self {
        Self {
            wealth: 0.20,
            trust: 0.20,
            religion: 0.10,
            civilization: 0.15,
            education: 0.20,
            political_power: 0.15,
        }
    }

    pub fn education_weighted() -> Self {
        Self {
            wealth: 0.15,
            trust: 0.20,
            religion: 0.10,
            civilization: 0.15,
            education: 0.25,
            political_power: 0.15,
        }
    }

    pub fn power_weighted() -> Self {
        Self {
            wealth: 0.20,
            trust: 0.15,
            religion: 0.10,
            civilization: 0.15,
            education: 0.20,
            political_power: 0.20,
        }
    }

    pub fn sum(&self) -> f64 {
        self.wealth
            + self.trust
            + self.religion
            + self.civilization
            + self.education
            + self.political_power
    }

    pub fn wsi(&self, state: &StateVector) -> f64 {
        self.wealth * state.wealth
            + self.trust * state.trust
            + self.religion * state.religion
            + self.civilization * state.civilization
            + self.education * state.education
            + self.political_power * state.political_power
    }
}

impl Default for WsiWeights {
    fn default() -> Self {
        Self::balanced()
    }
}

/// Named WSI weight sets, selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WsiPreset {
    #[default]
    Balanced,
    EducationWeighted,
    PowerWeighted,
}

impl WsiPreset {
    pub fn weights(self) -> WsiWeights {
        match self {
            WsiPreset::Balanced => WsiWeights::balanced(),
            WsiPreset::EducationWeighted => WsiWeights::education_weighted(),
            WsiPreset::PowerWeighted => WsiWeights::power_weighted(),
        }
    }
}

/// Weights of T, P and C in the TPC composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TpcWeights {
    pub time_sense: f64,
    pub personal_agency: f64,
    pub cultural_anchoring: f64,
}

impl TpcWeights {
    pub fn sum(&self) -> f64 {
        self.time_sense + self.personal_agency + self.cultural_anchoring
    }
}

impl Default for TpcWeights {
    fn default() -> Self {
        Self {
            time_sense: 0.35,
            personal_agency: 0.35,
            cultural_anchoring: 0.30,
        }
    }
}

/// How nominal capacity (soc) is turned into effective capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityScheme {
    /// soc × (0.3 + 0.7·trust) × (0.5 + 0.5·C)
    #[default]
    Multiplicative,
    /// soc + 0.15·trust + 0.10·C
    Additive,
}

impl CapacityScheme {
    pub fn effective_capacity(self, state: &StateVector) -> f64 {
        match self {
            CapacityScheme::Multiplicative => {
                state.soc
                    * (0.3 + 0.7 * state.trust)
                    * (0.5 + 0.5 * state.cultural_anchoring)
            }
            CapacityScheme::Additive => {
                state.soc + 0.15 * state.trust + 0.10 * state.cultural_anchoring
            }
        }
    }
}

/// How theta is banded into an [`EquilibriumZone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneScheme {
    /// Monotone bands; theta = 1.0 is already crisis.
    #[default]
    OneSided,
    /// Bands by distance from theta = 1.0, which is equilibrium.
    ElasticMiddle,
}

/// Slack on the elastic-middle band edges, so `|theta - 1|` rounding does not
/// push an edge value such as 0.85 into the next band.
pub const ZONE_EDGE_TOLERANCE: f64 = 1e-9;

impl ZoneScheme {
    pub fn classify(self, theta: f64) -> EquilibriumZone {
        match self {
            ZoneScheme::OneSided => {
                if theta < 0.7 {
                    EquilibriumZone::Stable
                } else if theta < 0.9 {
                    EquilibriumZone::Fragile
                } else if theta < 1.0 {
                    EquilibriumZone::Critical
                } else {
                    EquilibriumZone::Crisis
                }
            }
            ZoneScheme::ElasticMiddle => {
                let distance = (theta - 1.0).abs();
                let high = theta > 1.0;
                let within = |band: f64| distance <= band + ZONE_EDGE_TOLERANCE;
                if within(0.15) {
                    EquilibriumZone::Equilibrium
                } else if within(0.30) {
                    if high {
                        EquilibriumZone::ElevatedStrain
                    } else {
                        EquilibriumZone::UnderCapacity
                    }
                } else if within(0.50) {
                    if high {
                        EquilibriumZone::CriticalStrain
                    } else {
                        EquilibriumZone::Stagnation
                    }
                } else if high {
                    EquilibriumZone::Overload
                } else {
                    EquilibriumZone::Collapse
                }
            }
        }
    }
}

/// Index calculator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub wsi_weights: WsiWeights,
    pub tpc_weights: TpcWeights,
    pub capacity: CapacityScheme,
    pub zones: ZoneScheme,
    /// Steepness k of the signal-inversion sigmoid
    pub signal_steepness: f64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            wsi_weights: WsiWeights::default(),
            tpc_weights: TpcWeights::default(),
            capacity: CapacityScheme::default(),
            zones: ZoneScheme::default(),
            signal_steepness: 2.0,
        }
    }
}

/// Linear payoff of one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffRule {
    /// Coefficient per field; the payoff starts as the weighted sum
    pub coefficients: FieldMap,
    /// Cost per unit of theta above 1.0
    #[serde(default)]
    pub strain_penalty: f64,
}

impl PayoffRule {
    pub fn new(coefficients: &[(Field, f64)], strain_penalty: f64) -> Self {
        Self {
            coefficients: coefficients.iter().copied().collect(),
            strain_penalty,
        }
    }

    /// Payoff ignoring system strain.
    pub fn immediate(&self, state: &StateVector) -> f64 {
        self.coefficients
            .iter()
            .map(|(&field, &coefficient)| coefficient * state.get(field))
            .sum()
    }

    /// Cost of running above capacity; zero while theta ≤ 1.
    pub fn strain_cost(&self, theta: f64) -> f64 {
        self.strain_penalty * (theta - 1.0).max(0.0)
    }

    pub fn with_strain(&self, state: &StateVector, theta: f64) -> f64 {
        self.immediate(state) - self.strain_cost(theta)
    }
}

/// What phi scales while the signal is inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InversionScope {
    /// `(base - penalty) × phi`. A payoff already pushed below zero by the
    /// strain penalty turns positive under a negative phi.
    #[default]
    WholePayoff,
    /// `base × phi - penalty`, the cheating-dilemma form. Strain cost is never
    /// sign-flipped, so inverted payoffs stay negative.
    BasePayoff,
}

/// Payoff rules for the three actors plus the inversion condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoffConfig {
    pub regime: PayoffRule,
    pub opposition: PayoffRule,
    pub population: PayoffRule,
    /// Payoffs are multiplied by phi while W_acc is below this value
    pub inversion_threshold: f64,
    pub inversion_scope: InversionScope,
}

impl PayoffConfig {
    pub fn rule(&self, actor: Actor) -> &PayoffRule {
        match actor {
            Actor::Regime => &self.regime,
            Actor::Opposition => &self.opposition,
            Actor::Population => &self.population,
        }
    }

    /// Effective payoff of one actor at `theta`, with phi applied when `inverted`.
    pub fn effective(
        &self,
        actor: Actor,
        state: &StateVector,
        theta: f64,
        inverted: bool,
        phi: f64,
    ) -> f64 {
        let rule = self.rule(actor);
        if !inverted {
            return rule.with_strain(state, theta);
        }
        match self.inversion_scope {
            InversionScope::WholePayoff => rule.with_strain(state, theta) * phi,
            InversionScope::BasePayoff => rule.immediate(state) * phi - rule.strain_cost(theta),
        }
    }
}

impl Default for PayoffConfig {
    fn default() -> Self {
        Self {
            regime: PayoffRule::new(&[(Field::PoliticalPower, 10.0)], 30.0),
            opposition: PayoffRule::new(
                &[(Field::Trust, 8.0), (Field::OppositionSymbolicCapital, 5.0)],
                20.0,
            ),
            population: PayoffRule::new(
                &[
                    (Field::Wealth, 5.0),
                    (Field::Education, 5.0),
                    (Field::PopulationExitRate, -10.0),
                ],
                0.0,
            ),
            inversion_threshold: 0.0,
            inversion_scope: InversionScope::default(),
        }
    }

}

/// TPC composite on the 1-7 scale.
pub fn tpc_score(state: &StateVector, weights: &TpcWeights) -> f64 {
    1.0 + 6.0
        * (weights.time_sense * state.time_sense
            + weights.personal_agency * state.personal_agency
            + weights.cultural_anchoring * state.cultural_anchoring)
}

/// Maps a TPC score onto the [0.8, 1.2] amplifier.
pub fn tpc_modifier(score: f64) -> f64 {
    0.8 + 0.4 * ((score - 1.0) / 6.0).clamp(0.0, 1.0)
}

/// W_acc = (T + P + C) - (R + S).
pub fn dual_pull_balance(state: &StateVector) -> f64 {
    state.acceptance() - state.resistance()
}

/// phi = 2·sigmoid(k·W) - 1. Strictly increasing, phi(0) = 0, bounded by ±1.
pub fn signal_multiplier(w_acc: f64, steepness: f64) -> f64 {
    2.0 / (1.0 + (-steepness * w_acc).exp()) - 1.0
}

/// Computes [`DerivedMetrics`] for a state under fixed settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexCalculator {
    pub indices: IndexConfig,
    pub payoffs: PayoffConfig,
}

impl IndexCalculator {
    pub fn new(indices: IndexConfig, payoffs: PayoffConfig) -> Self {
        Self { indices, payoffs }
    }

    /// Derives every metric, refusing states or results outside the model's domain.
    pub fn compute(&self, state: &StateVector) -> Result<DerivedMetrics, EngineError> {
        state.validate()?;

        let wsi = self.indices.wsi_weights.wsi(state);
        let tpc_score = tpc_score(state, &self.indices.tpc_weights);
        let tpc_modifier = tpc_modifier(tpc_score);
        let adjusted_wsi = wsi * tpc_modifier;

        let effective_capacity = self.indices.capacity.effective_capacity(state);
        if !effective_capacity.is_finite() || effective_capacity <= 0.0 {
            return Err(EngineError::domain(
                "effective_capacity",
                effective_capacity,
                "must be positive and finite",
            ));
        }
        let theta = adjusted_wsi / effective_capacity;
        check_finite("theta", theta)?;

        let dual_pull_balance = dual_pull_balance(state);
        let signal_multiplier = signal_multiplier(dual_pull_balance, self.indices.signal_steepness);
        check_finite("signal_multiplier", signal_multiplier)?;
        let signal_inverted = dual_pull_balance < self.payoffs.inversion_threshold;

        let mut payoffs = ActorPayoffs::default();
        let mut immediate_payoffs = ActorPayoffs::default();
        for actor in Actor::ALL {
            immediate_payoffs.set(actor, self.payoffs.rule(actor).immediate(state));
            payoffs.set(
                actor,
                self.payoffs
                    .effective(actor, state, theta, signal_inverted, signal_multiplier),
            );
        }
        if !payoffs.all_finite() || !immediate_payoffs.all_finite() {
            return Err(EngineError::domain(
                "payoffs",
                f64::NAN,
                "non-finite actor payoff",
            ));
        }

        Ok(DerivedMetrics {
            wsi,
            tpc_score,
            tpc_modifier,
            adjusted_wsi,
            effective_capacity,
            theta,
            dual_pull_balance,
            signal_multiplier,
            signal_inverted,
            payoffs,
            immediate_payoffs,
            zone: self.indices.zones.classify(theta),
        })
    }
}

fn check_finite(quantity: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::domain(quantity, value, "not finite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use societrics_events::fixtures;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_named_weight_sets_sum_to_one() {
        for preset in [
            WsiPreset::Balanced,
            WsiPreset::EducationWeighted,
            WsiPreset::PowerWeighted,
        ] {
            assert!((preset.weights().sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
        }
        assert!((TpcWeights::default().sum() - 1.0).abs() < WEIGHT_SUM_TOLERANCE);
    }

    #[test]
    fn test_tpc_modifier_range() {
        assert!((tpc_modifier(1.0) - 0.8).abs() < EPS);
        assert!((tpc_modifier(7.0) - 1.2).abs() < EPS);
        assert!((tpc_modifier(-3.0) - 0.8).abs() < EPS);
        assert!((tpc_modifier(12.0) - 1.2).abs() < EPS);
    }

    #[test]
    fn test_reference_state_components() {
        let state = fixtures::reference_state();

        let wsi = WsiWeights::education_weighted().wsi(&state);
        assert!((wsi - 0.4225).abs() < EPS);

        let score = tpc_score(&state, &TpcWeights::default());
        assert!((score - 3.4).abs() < EPS);
        assert!((tpc_modifier(score) - 0.96).abs() < EPS);

        let capacity = CapacityScheme::Multiplicative.effective_capacity(&state);
        assert!((capacity - 0.0357).abs() < EPS);
    }

    #[test]
    fn test_additive_capacity() {
        let state = fixtures::reference_state();
        let capacity = CapacityScheme::Additive.effective_capacity(&state);
        assert!((capacity - (0.10 + 0.045 + 0.04)).abs() < EPS);
    }

    #[test]
    fn test_signal_multiplier_shape() {
        assert_eq!(signal_multiplier(0.0, 2.0), 0.0);
        assert!(signal_multiplier(10.0, 2.0) > 0.999);
        assert!(signal_multiplier(-10.0, 2.0) < -0.999);

        let mut previous = signal_multiplier(-3.0, 2.0);
        for i in 1..=60 {
            let w = -3.0 + i as f64 * 0.1;
            let phi = signal_multiplier(w, 2.0);
            assert!(phi > previous, "phi not increasing at {}", w);
            previous = phi;
        }
    }

    #[test]
    fn test_one_sided_zones() {
        let scheme = ZoneScheme::OneSided;
        assert_eq!(scheme.classify(0.5), EquilibriumZone::Stable);
        assert_eq!(scheme.classify(0.7), EquilibriumZone::Fragile);
        assert_eq!(scheme.classify(0.95), EquilibriumZone::Critical);
        assert_eq!(scheme.classify(1.0), EquilibriumZone::Crisis);
        assert_eq!(scheme.classify(0.999_999), EquilibriumZone::Critical);
    }

    #[test]
    fn test_elastic_middle_zones() {
        let scheme = ZoneScheme::ElasticMiddle;
        assert_eq!(scheme.classify(1.0), EquilibriumZone::Equilibrium);
        assert_eq!(scheme.classify(1.1), EquilibriumZone::Equilibrium);
        assert_eq!(scheme.classify(1.2), EquilibriumZone::ElevatedStrain);
        assert_eq!(scheme.classify(0.8), EquilibriumZone::UnderCapacity);
        assert_eq!(scheme.classify(1.4), EquilibriumZone::CriticalStrain);
        assert_eq!(scheme.classify(0.6), EquilibriumZone::Stagnation);
        assert_eq!(scheme.classify(2.0), EquilibriumZone::Overload);
        assert_eq!(scheme.classify(0.2), EquilibriumZone::Collapse);
    }

    #[test]
    fn test_one_sided_zone_edges() {
        let scheme = ZoneScheme::OneSided;
        assert_eq!(scheme.classify(0.699_999), EquilibriumZone::Stable);
        assert_eq!(scheme.classify(0.7), EquilibriumZone::Fragile);
        assert_eq!(scheme.classify(0.899_999), EquilibriumZone::Fragile);
        assert_eq!(scheme.classify(0.9), EquilibriumZone::Critical);
        assert_eq!(scheme.classify(1.0), EquilibriumZone::Crisis);
    }

    #[test]
    fn test_elastic_middle_edges_are_symmetric() {
        use EquilibriumZone::*;

        let scheme = ZoneScheme::ElasticMiddle;
        // (low edge, high edge, zone at the edge low/high, zone just past it low/high)
        let edges = [
            (0.85, 1.15, (Equilibrium, Equilibrium), (UnderCapacity, ElevatedStrain)),
            (0.70, 1.30, (UnderCapacity, ElevatedStrain), (Stagnation, CriticalStrain)),
            (0.50, 1.50, (Stagnation, CriticalStrain), (Collapse, Overload)),
        ];
        for (low, high, at_edge, past_edge) in edges {
            assert_eq!(scheme.classify(low), at_edge.0, "theta = {}", low);
            assert_eq!(scheme.classify(high), at_edge.1, "theta = {}", high);
            assert_eq!(scheme.classify(low - 0.001), past_edge.0, "theta = {}", low - 0.001);
            assert_eq!(scheme.classify(high + 0.001), past_edge.1, "theta = {}", high + 0.001);
        }
    }

    #[test]
    fn test_compute_reference_state() {
        let calculator = IndexCalculator::new(
            IndexConfig {
                wsi_weights: WsiWeights::education_weighted(),
                ..IndexConfig::default()
            },
            PayoffConfig::default(),
        );
        let metrics = calculator.compute(&fixtures::reference_state()).unwrap();

        assert!((metrics.adjusted_wsi - 0.4056).abs() < EPS);
        assert!((metrics.theta - 0.4056 / 0.0357).abs() < 1e-6);
        assert_eq!(metrics.zone, EquilibriumZone::Crisis);
        assert!(metrics.threshold_crossed());

        // W_acc = 1.2 - 1.5 < 0, so payoffs are inverted
        assert!((metrics.dual_pull_balance + 0.3).abs() < EPS);
        assert!(metrics.signal_inverted);
        assert!(metrics.signal_multiplier < 0.0);
    }

    #[test]
    fn test_payoffs_penalize_strain() {
        let calculator = IndexCalculator::default();
        let state = fixtures::reference_state();
        let metrics = calculator.compute(&state).unwrap();

        assert!((metrics.immediate_payoffs.regime - 4.0).abs() < EPS);
        assert!((metrics.immediate_payoffs.opposition - 4.9).abs() < EPS);
        assert!((metrics.immediate_payoffs.population - 0.0).abs() < EPS);

        let penalty = metrics.theta - 1.0;
        let expected_regime = (4.0 - 30.0 * penalty) * metrics.signal_multiplier;
        assert!((metrics.payoffs.regime - expected_regime).abs() < 1e-6);
    }

    #[test]
    fn test_base_payoff_inversion_keeps_strain_cost_negative() {
        let whole = IndexCalculator::default();
        let base = IndexCalculator::new(
            IndexConfig::default(),
            PayoffConfig {
                inversion_scope: InversionScope::BasePayoff,
                ..PayoffConfig::default()
            },
        );
        let state = fixtures::reference_state();
        let whole_metrics = whole.compute(&state).unwrap();
        let base_metrics = base.compute(&state).unwrap();

        // Penalty dwarfs the base, so inverting the whole payoff flips it positive
        assert!(whole_metrics.payoffs.regime > 0.0);

        let phi = base_metrics.signal_multiplier;
        let expected = 4.0 * phi - 30.0 * (base_metrics.theta - 1.0);
        assert!((base_metrics.payoffs.regime - expected).abs() < 1e-6);
        assert!(base_metrics.payoffs.regime < 0.0);
        assert!(base_metrics.payoffs.opposition < 0.0);
        assert_eq!(base_metrics.immediate_payoffs, whole_metrics.immediate_payoffs);
    }

    #[test]
    fn test_no_inversion_when_balance_positive() {
        let mut state = StateVector::default();
        state.rigidity = 0.1;
        state.social_pressure = 0.1;
        let metrics = IndexCalculator::default().compute(&state).unwrap();

        assert!(metrics.dual_pull_balance > 0.0);
        assert!(!metrics.signal_inverted);
        assert!(
            (metrics.payoffs.population - metrics.immediate_payoffs.population).abs() < EPS
        );
    }

    #[test]
    fn test_compute_rejects_out_of_domain_state() {
        let mut state = StateVector::default();
        state.soc = 0.0;
        let err = IndexCalculator::default().compute(&state).unwrap_err();
        assert!(matches!(err, EngineError::DomainViolation { .. }));
    }

    #[test]
    fn test_compute_rejects_nan() {
        let mut state = StateVector::default();
        state.wealth = f64::NAN;
        assert!(IndexCalculator::default().compute(&state).is_err());
    }
}
