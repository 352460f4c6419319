//! Scripted Plans
//!
//! A plan schedules shock and phase activations by step index so a run can
//! be replayed exactly. Actions scheduled for step `i` are applied before
//! step `i` executes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::config::{read_file, ConfigError};
use crate::error::EngineError;
use crate::scenario::{Activation, Scenario};

/// What to activate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanAction {
    Shock { id: String },
    Phase { id: String },
}

impl PlanAction {
    pub fn apply(&self, scenario: &mut Scenario) -> Result<Activation, EngineError> {
        match self {
            PlanAction::Shock { id } => scenario.apply_shock(id),
            PlanAction::Phase { id } => scenario.apply_phase(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAction {
    /// Elapsed step count at which the action fires
    pub step: u64,
    pub action: PlanAction,
}

/// An ordered list of scheduled actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub actions: Vec<PlannedAction>,
}

impl Plan {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            actions: Vec::new(),
        }
    }

    pub fn shock_at(mut self, step: u64, id: &str) -> Self {
        self.actions.push(PlannedAction {
            step,
            action: PlanAction::Shock { id: id.to_string() },
        });
        self
    }

    pub fn phase_at(mut self, step: u64, id: &str) -> Self {
        self.actions.push(PlannedAction {
            step,
            action: PlanAction::Phase { id: id.to_string() },
        });
        self
    }

    /// Actions scheduled for `step`, in plan order.
    pub fn actions_at(&self, step: u64) -> impl Iterator<Item = &PlanAction> {
        self.actions
            .iter()
            .filter(move |planned| planned.step == step)
            .map(|planned| &planned.action)
    }

    /// Applies the actions scheduled for the scenario's current step.
    pub fn apply_due(&self, scenario: &mut Scenario) -> Result<(), EngineError> {
        let step = scenario.elapsed();
        for action in self.actions_at(step) {
            action.apply(scenario)?;
        }
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = read_file(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Runs `steps` steps, applying each scheduled action first.
///
/// Stops at the first refused action or step; the scenario keeps everything
/// that happened before it.
pub fn run_plan(scenario: &mut Scenario, plan: &Plan, steps: u64) -> Result<(), EngineError> {
    if !plan.name.is_empty() {
        info!(plan = %plan.name, steps, "running plan");
    }
    for _ in 0..steps {
        plan.apply_due(scenario)?;
        scenario.step()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::preset::Preset;
    use societrics_events::InterventionPhase;

    fn scenario() -> Scenario {
        Scenario::new(&EngineConfig::default(), Preset::custom()).unwrap()
    }

    #[test]
    fn test_plan_from_toml() {
        let toml = r#"
            name = "sanctions then recovery"

            [[actions]]
            step = 0
            action = { type = "shock", id = "sanctions" }

            [[actions]]
            step = 10
            action = { type = "phase", id = "circuitBreaker" }
        "#;
        let plan = Plan::from_str(toml).unwrap();

        assert_eq!(plan.actions.len(), 2);
        assert_eq!(
            plan.actions[0].action,
            PlanAction::Shock { id: "sanctions".to_string() }
        );
        assert_eq!(plan.actions_at(10).count(), 1);
        assert_eq!(plan.actions_at(5).count(), 0);
    }

    #[test]
    fn test_run_plan_applies_before_step() {
        let plan = Plan::new("test")
            .shock_at(0, "oil")
            .phase_at(3, "circuit_breaker");
        let mut scenario = scenario();

        run_plan(&mut scenario, &plan, 6).unwrap();

        let history = scenario.history();
        assert_eq!(history.len(), 6);
        assert_eq!(history[0].active_shocks, vec!["oil".to_string()]);
        assert_eq!(history[2].phase, None);
        assert_eq!(history[3].phase, Some(InterventionPhase::CircuitBreaker));
        assert_eq!(scenario.log()[1].step, 3);
    }

    #[test]
    fn test_run_plan_stops_on_refused_action() {
        let plan = Plan::new("bad").phase_at(2, "incentive_engine");
        let mut scenario = scenario();

        let err = run_plan(&mut scenario, &plan, 5).unwrap_err();

        assert!(matches!(err, EngineError::InvalidPhaseTransition { .. }));
        assert_eq!(scenario.elapsed(), 2);
    }

    #[test]
    fn test_empty_plan_is_plain_advance() {
        let mut planned = scenario();
        let mut advanced = scenario();

        run_plan(&mut planned, &Plan::default(), 10).unwrap();
        advanced.advance(10).unwrap();

        assert_eq!(planned.history(), advanced.history());
    }
}
