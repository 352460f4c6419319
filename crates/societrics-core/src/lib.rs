//! Societrics strain engine.
//!
//! A deterministic, discrete-time simulation of the system-stress model:
//! a state vector of normalized indicators evolves step by step under
//! natural decay, external shocks and a fixed three-phase intervention
//! sequence, and every step records the derived strain ratio theta.

pub mod config;
pub mod dynamics;
pub mod error;
pub mod indices;
pub mod output;
pub mod phases;
pub mod plan;
pub mod preset;
pub mod scenario;
pub mod shocks;

use societrics_events::{Field, FieldMap};

pub use config::{default_config_toml, ConfigError, EngineConfig};
pub use error::EngineError;
pub use indices::IndexCalculator;
pub use plan::{run_plan, Plan, PlanAction, PlannedAction};
pub use preset::Preset;
pub use scenario::{Activation, Scenario};

/// Builds a [`FieldMap`] from literal pairs.
pub(crate) fn field_map(pairs: &[(Field, f64)]) -> FieldMap {
    pairs.iter().copied().collect()
}
