//! Equilibrium Analysis
//!
//! Contrasts a naive static reading of the actor payoffs with the reading the
//! strain model supports. The analysis is descriptive only and never feeds
//! back into a scenario.

use serde::{Deserialize, Serialize};
use societrics_events::{Actor, DerivedMetrics, EquilibriumZone, InterventionPhase, StepRecord};
use std::fmt;

/// Outcome attached to every static prediction.
pub const STATIC_OUTCOME: &str = "crisis persists";

/// Zones at or above this severity (crisis, collapse, overload) fail the
/// structural condition whatever theta is.
pub const BREAKDOWN_SEVERITY: u8 = 3;

/// Thresholds for the model-consistent conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Dual-pull balance the moral condition aims for
    pub moral_target: f64,
    /// Allowed distance from the target
    pub moral_tolerance: f64,
    /// Lead the best alternative needs over the myopic favorite
    pub payoff_margin: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            moral_target: 1.0,
            moral_tolerance: 0.5,
            payoff_margin: 1.0,
        }
    }
}

/// The myopic ("Nash") reading: whoever gains most right now keeps doing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPrediction {
    pub actor: Actor,
    pub strategy: String,
    pub immediate_payoff: f64,
    pub outcome: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    pub moral: bool,
    pub strategic: bool,
    pub structural: bool,
}

impl Conditions {
    pub fn all(&self) -> bool {
        self.moral && self.strategic && self.structural
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquilibriumLabel {
    RecoveryActive,
    StabilizationActive,
    DeEscalationActive,
    SocietricsEquilibrium,
    ForcedHonest,
    InterventionRequired,
    Monitor,
}

impl EquilibriumLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            EquilibriumLabel::RecoveryActive => "recovery_active",
            EquilibriumLabel::StabilizationActive => "stabilization_active",
            EquilibriumLabel::DeEscalationActive => "de_escalation_active",
            EquilibriumLabel::SocietricsEquilibrium => "societrics_equilibrium",
            EquilibriumLabel::ForcedHonest => "forced_honest",
            EquilibriumLabel::InterventionRequired => "intervention_required",
            EquilibriumLabel::Monitor => "monitor",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EquilibriumLabel::RecoveryActive => "Incentives realigned, recovery under way",
            EquilibriumLabel::StabilizationActive => "Institutions stabilizing, capacity expanding",
            EquilibriumLabel::DeEscalationActive => "Feedback loops interrupted",
            EquilibriumLabel::SocietricsEquilibrium => "Strain absorbed and incentives aligned",
            EquilibriumLabel::ForcedHonest => "System cost has made the myopic strategy irrational",
            EquilibriumLabel::InterventionRequired => "Strain exceeds capacity; intervene",
            EquilibriumLabel::Monitor => "No condition decisive; keep watching",
        }
    }
}

impl fmt::Display for EquilibriumLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    pub label: EquilibriumLabel,
    pub description: String,
    pub conditions: Conditions,
    pub theta: f64,
    pub zone: EquilibriumZone,
    pub zone_description: String,
    /// Mean theta over the supplied history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_theta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumAnalysis {
    pub static_prediction: StaticPrediction,
    pub model_prediction: ModelPrediction,
}

#[derive(Debug, Clone, Default)]
pub struct EquilibriumAnalyzer {
    config: AnalyzerConfig,
}

impl EquilibriumAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn static_prediction(&self, metrics: &DerivedMetrics) -> StaticPrediction {
        let actor = metrics.immediate_payoffs.leader();
        StaticPrediction {
            actor,
            strategy: actor.myopic_strategy().to_string(),
            immediate_payoff: metrics.immediate_payoffs.get(actor),
            outcome: STATIC_OUTCOME.to_string(),
        }
    }

    pub fn conditions(&self, metrics: &DerivedMetrics, mean_theta: Option<f64>) -> Conditions {
        let moral = (metrics.dual_pull_balance - self.config.moral_target).abs()
            <= self.config.moral_tolerance;

        let favorite = metrics.immediate_payoffs.leader();
        let lead = metrics.payoffs.best_excluding(favorite) - metrics.payoffs.get(favorite);
        let strategic = lead > self.config.payoff_margin;

        let structural = metrics.zone.severity() < BREAKDOWN_SEVERITY
            && metrics.theta <= 1.0
            && mean_theta.map_or(true, |mean| mean <= 1.0);

        Conditions {
            moral,
            strategic,
            structural,
        }
    }

    pub fn model_prediction(
        &self,
        metrics: &DerivedMetrics,
        phase: Option<InterventionPhase>,
        history: Option<&[StepRecord]>,
    ) -> ModelPrediction {
        let mean_theta = history.and_then(mean_theta);
        let conditions = self.conditions(metrics, mean_theta);

        let label = match phase {
            Some(InterventionPhase::IncentiveEngine) => EquilibriumLabel::RecoveryActive,
            Some(InterventionPhase::StructuralFloor) => EquilibriumLabel::StabilizationActive,
            Some(InterventionPhase::CircuitBreaker) => EquilibriumLabel::DeEscalationActive,
            None if conditions.all() => EquilibriumLabel::SocietricsEquilibrium,
            None if !conditions.structural && conditions.strategic => EquilibriumLabel::ForcedHonest,
            None if !conditions.structural => EquilibriumLabel::InterventionRequired,
            None => EquilibriumLabel::Monitor,
        };

        ModelPrediction {
            label,
            description: label.description().to_string(),
            conditions,
            theta: metrics.theta,
            zone: metrics.zone,
            zone_description: metrics.zone.description().to_string(),
            mean_theta,
        }
    }

    pub fn analyze(
        &self,
        metrics: &DerivedMetrics,
        phase: Option<InterventionPhase>,
        history: Option<&[StepRecord]>,
    ) -> EquilibriumAnalysis {
        EquilibriumAnalysis {
            static_prediction: self.static_prediction(metrics),
            model_prediction: self.model_prediction(metrics, phase, history),
        }
    }
}

/// Mean theta over a history; `None` when it is empty.
pub fn mean_theta(history: &[StepRecord]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let total: f64 = history.iter().map(|r| r.metrics.theta).sum();
    Some(total / history.len() as f64)
}
