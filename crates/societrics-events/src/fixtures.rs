//! Sample data fixtures for testing.
//!
//! Ready-made states, metrics and records for other crates' tests.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // societrics-events = { workspace = true, features = ["test-fixtures"] }
//!
//! use societrics_events::fixtures;
//!
//! let state = fixtures::reference_state();
//! let record = fixtures::sample_record(3, 1.25);
//! ```

use crate::{
    ActorPayoffs, DerivedMetrics, EquilibriumZone, InterventionPhase, StateVector, StepRecord,
};

/// The reference crisis scenario.
///
/// With education-weighted WSI and multiplicative capacity this gives
/// WSI 0.4225, TPC score 3.4 and theta of roughly 11.36.
pub fn reference_state() -> StateVector {
    StateVector {
        wealth: 0.25,
        trust: 0.30,
        education: 0.55,
        civilization: 0.45,
        political_power: 0.40,
        religion: 0.60,
        time_sense: 0.45,
        personal_agency: 0.35,
        cultural_anchoring: 0.40,
        rigidity: 0.70,
        social_pressure: 0.80,
        soc: 0.10,
        regime_coercion: 0.70,
        regime_structural_control: 0.60,
        opposition_symbolic_capital: 0.50,
        population_exit_rate: 0.40,
    }
}

/// Hand-built metrics with the given theta and dual-pull balance.
///
/// Zone follows the one-sided scheme. Payoffs are fixed: regime leads on the
/// immediate view, opposition leads once strain is priced in.
pub fn sample_metrics(theta: f64, dual_pull_balance: f64) -> DerivedMetrics {
    let zone = if theta >= 1.0 {
        EquilibriumZone::Crisis
    } else if theta >= 0.9 {
        EquilibriumZone::Critical
    } else if theta >= 0.7 {
        EquilibriumZone::Fragile
    } else {
        EquilibriumZone::Stable
    };
    let penalty = (theta - 1.0).max(0.0);
    DerivedMetrics {
        wsi: 0.4,
        tpc_score: 4.0,
        tpc_modifier: 1.0,
        adjusted_wsi: 0.4,
        effective_capacity: 0.4 / theta,
        theta,
        dual_pull_balance,
        signal_multiplier: 2.0 / (1.0 + (-2.0 * dual_pull_balance).exp()) - 1.0,
        signal_inverted: false,
        payoffs: ActorPayoffs {
            regime: 6.0 - 30.0 * penalty,
            opposition: 5.0 - 20.0 * penalty,
            population: 2.0,
        },
        immediate_payoffs: ActorPayoffs {
            regime: 6.0,
            opposition: 5.0,
            population: 2.0,
        },
        zone,
    }
}

/// A record at `step` carrying [`reference_state`] and [`sample_metrics`].
pub fn sample_record(step: u64, theta: f64) -> StepRecord {
    StepRecord {
        step,
        phase: None,
        active_shocks: Vec::new(),
        state: reference_state(),
        metrics: sample_metrics(theta, -0.3),
    }
}

/// Same as [`sample_record`] with an active phase.
pub fn sample_record_in_phase(step: u64, theta: f64, phase: InterventionPhase) -> StepRecord {
    StepRecord {
        phase: Some(phase),
        ..sample_record(step, theta)
    }
}
