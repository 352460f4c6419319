//! Scenario
//!
//! A running simulation: the current state, the active phase and shocks, the
//! elapsed step count, the per-step history and the activation log. The
//! scenario is an explicit value owned by the caller; nothing is global.
//!
//! Every mutating operation works on a copy of the state and commits only
//! when the result is inside the model's domain, so a refused operation
//! leaves the scenario exactly as it was.

use societrics_events::{
    DerivedMetrics, InterventionPhase, LogEntry, LogKind, StateVector, StepRecord,
};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::dynamics::DynamicsConfig;
use crate::error::EngineError;
use crate::indices::IndexCalculator;
use crate::phases::PhaseTable;
use crate::preset::Preset;
use crate::shocks::ShockRegistry;

/// Result of activating a shock or phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Applied,
    /// Already active; nothing changed
    AlreadyActive,
}

/// The fixed rules a scenario runs under.
#[derive(Debug, Clone)]
pub struct Engine {
    pub shocks: ShockRegistry,
    pub phases: PhaseTable,
    pub calculator: IndexCalculator,
    pub dynamics: DynamicsConfig,
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            shocks: config.shock_registry(),
            phases: config.phase_table(),
            calculator: config.calculator(),
            dynamics: config.dynamics.clone(),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct Scenario {
    engine: Engine,
    preset: Preset,
    state: StateVector,
    metrics: DerivedMetrics,
    phase: Option<InterventionPhase>,
    active_shocks: Vec<String>,
    elapsed: u64,
    history: Vec<StepRecord>,
    log: Vec<LogEntry>,
}

impl Scenario {
    /// Creates a scenario from a preset, validating it first.
    pub fn new(config: &EngineConfig, preset: Preset) -> Result<Self, EngineError> {
        Self::with_engine(Engine::new(config), preset)
    }

    pub fn with_engine(engine: Engine, preset: Preset) -> Result<Self, EngineError> {
        preset.validate()?;
        let metrics = engine.calculator.compute(&preset.state)?;
        Ok(Self {
            engine,
            state: preset.state,
            preset,
            metrics,
            phase: None,
            active_shocks: Vec::new(),
            elapsed: 0,
            history: Vec::new(),
            log: Vec::new(),
        })
    }

    pub fn current_state(&self) -> &StateVector {
        &self.state
    }

    /// Metrics of the current state (including effects applied since the last step).
    pub fn current_metrics(&self) -> &DerivedMetrics {
        &self.metrics
    }

    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn active_phase(&self) -> Option<InterventionPhase> {
        self.phase
    }

    pub fn active_shocks(&self) -> &[String] {
        &self.active_shocks
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The only phase `apply_phase` would accept. `None` once the sequence is complete.
    pub fn next_eligible_phase(&self) -> Option<InterventionPhase> {
        InterventionPhase::next_after(self.phase)
    }

    /// Activates a shock by id, applying its one-time effects.
    pub fn apply_shock(&mut self, id: &str) -> Result<Activation, EngineError> {
        let Some(shock) = self.engine.shocks.get(id) else {
            warn!(id, "unknown shock");
            return Err(EngineError::UnknownShockOrPhaseId(id.to_string()));
        };
        if self.active_shocks.iter().any(|active| active == id) {
            debug!(id, "shock already active");
            return Ok(Activation::AlreadyActive);
        }

        let mut next = self.state;
        next.apply_multipliers(&shock.effects);
        let metrics = self.engine.calculator.compute(&next)?;
        let entry = LogEntry::new(self.elapsed, LogKind::Shock, &shock.id, &shock.name);

        info!(id, step = self.elapsed, theta = metrics.theta, "shock applied");
        self.commit(next, metrics);
        self.active_shocks.push(id.to_string());
        self.log.push(entry);
        Ok(Activation::Applied)
    }

    /// Activates a phase by id (`circuit_breaker` or `circuitBreaker`, etc.).
    pub fn apply_phase(&mut self, id: &str) -> Result<Activation, EngineError> {
        let phase: InterventionPhase = id.parse().map_err(|_| {
            warn!(id, "unknown phase");
            EngineError::UnknownShockOrPhaseId(id.to_string())
        })?;
        self.apply_intervention(phase)
    }

    /// Activates the given phase if it is exactly the next in sequence.
    pub fn apply_intervention(
        &mut self,
        phase: InterventionPhase,
    ) -> Result<Activation, EngineError> {
        if self.phase == Some(phase) {
            debug!(phase = %phase, "phase already active");
            return Ok(Activation::AlreadyActive);
        }
        let next_eligible = self.next_eligible_phase();
        if next_eligible != Some(phase) {
            let err = EngineError::InvalidPhaseTransition {
                requested: phase,
                current: self.phase,
                next_eligible,
            };
            warn!(error = %err, "phase transition refused");
            return Err(err);
        }
        let Some(definition) = self.engine.phases.get(phase) else {
            return Err(EngineError::UnknownShockOrPhaseId(phase.id().to_string()));
        };

        let mut next = self.state;
        next.apply_multipliers(&definition.effects);
        let metrics = self.engine.calculator.compute(&next)?;
        let entry = LogEntry::new(
            self.elapsed,
            LogKind::Intervention,
            phase.id(),
            &definition.name,
        );

        info!(phase = %phase, step = self.elapsed, theta = metrics.theta, "phase applied");
        self.commit(next, metrics);
        self.phase = Some(phase);
        self.log.push(entry);
        Ok(Activation::Applied)
    }

    /// Runs one step and returns its record.
    ///
    /// Order: ongoing shock effects, recovery or natural decay, clamp,
    /// projections, clamp, metrics. A domain violation refuses the step.
    pub fn step(&mut self) -> Result<&StepRecord, EngineError> {
        let mut next = self.state;

        for id in &self.active_shocks {
            if let Some(shock) = self.engine.shocks.get(id) {
                next.scale_fields(&shock.ongoing_effects);
            }
        }

        let definition = self.phase.and_then(|phase| self.engine.phases.get(phase));
        self.engine.dynamics.evolve(&mut next, definition);
        next.clamp_all();

        self.engine
            .dynamics
            .project(&mut next, &self.engine.calculator.indices.wsi_weights);
        next.clamp_all();

        let metrics = match self.engine.calculator.compute(&next) {
            Ok(metrics) => metrics,
            Err(err) => {
                warn!(step = self.elapsed, error = %err, "step refused");
                return Err(err);
            }
        };

        debug!(
            step = self.elapsed,
            theta = metrics.theta,
            zone = %metrics.zone,
            "step"
        );

        self.commit(next, metrics);
        self.history.push(StepRecord {
            step: self.elapsed,
            phase: self.phase,
            active_shocks: self.active_shocks.clone(),
            state: next,
            metrics,
        });
        self.elapsed += 1;

        let index = self.history.len() - 1;
        Ok(&self.history[index])
    }

    /// Runs `steps` steps, stopping at the first refusal.
    pub fn advance(&mut self, steps: u64) -> Result<(), EngineError> {
        for _ in 0..steps {
            self.step()?;
        }
        Ok(())
    }

    /// Starts over from `preset`, clearing history, shocks, phase and log.
    pub fn reset(&mut self, preset: Preset) -> Result<(), EngineError> {
        preset.validate()?;
        let metrics = self.engine.calculator.compute(&preset.state)?;

        info!(preset = %preset.id, "scenario reset");
        self.state = preset.state;
        self.metrics = metrics;
        self.preset = preset;
        self.phase = None;
        self.active_shocks.clear();
        self.elapsed = 0;
        self.history.clear();
        self.log.clear();
        Ok(())
    }

    /// Resets to the preset the scenario was last built from.
    pub fn restart(&mut self) -> Result<(), EngineError> {
        self.reset(self.preset.clone())
    }

    fn commit(&mut self, state: StateVector, metrics: DerivedMetrics) {
        self.state = state;
        self.metrics = metrics;
    }
}
