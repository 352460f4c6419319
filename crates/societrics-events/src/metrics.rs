//! Derived Metrics
//!
//! Composite indices computed from a single state vector. These carry no
//! memory of earlier steps and can always be recomputed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three actors whose payoffs the crisis model tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    Regime,
    Opposition,
    Population,
}

impl Actor {
    pub const ALL: [Actor; 3] = [Actor::Regime, Actor::Opposition, Actor::Population];

    /// The short-term strategy a myopic reading attributes to this actor.
    pub fn myopic_strategy(self) -> &'static str {
        match self {
            Actor::Regime => "coercion",
            Actor::Opposition => "symbolic_resistance",
            Actor::Population => "exit",
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Actor::Regime => "regime",
            Actor::Opposition => "opposition",
            Actor::Population => "population",
        };
        f.write_str(name)
    }
}

/// Payoff per actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorPayoffs {
    pub regime: f64,
    pub opposition: f64,
    pub population: f64,
}

impl ActorPayoffs {
    pub fn get(&self, actor: Actor) -> f64 {
        match actor {
            Actor::Regime => self.regime,
            Actor::Opposition => self.opposition,
            Actor::Population => self.population,
        }
    }

    pub fn set(&mut self, actor: Actor, value: f64) {
        match actor {
            Actor::Regime => self.regime = value,
            Actor::Opposition => self.opposition = value,
            Actor::Population => self.population = value,
        }
    }

    /// Actor with the highest payoff. Ties go to the earlier actor in [`Actor::ALL`].
    pub fn leader(&self) -> Actor {
        let mut best = Actor::Regime;
        for actor in Actor::ALL {
            if self.get(actor) > self.get(best) {
                best = actor;
            }
        }
        best
    }

    /// Highest payoff among all actors except `excluded`.
    pub fn best_excluding(&self, excluded: Actor) -> f64 {
        Actor::ALL
            .iter()
            .filter(|&&a| a != excluded)
            .map(|&a| self.get(a))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn all_finite(&self) -> bool {
        self.regime.is_finite() && self.opposition.is_finite() && self.population.is_finite()
    }
}

/// Named band of the strain ratio theta.
///
/// Two classification schemes exist. The one-sided scheme uses
/// `Stable`..`Crisis`; the elastic-middle scheme, which treats theta = 1 as
/// the balanced point, uses the remaining variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquilibriumZone {
    // One-sided
    Stable,
    Fragile,
    Critical,
    Crisis,
    // Elastic-middle
    Equilibrium,
    UnderCapacity,
    ElevatedStrain,
    Stagnation,
    CriticalStrain,
    Collapse,
    Overload,
}

impl EquilibriumZone {
    /// 0 = settled, 1 = transient/fragile, 2 = critical, 3 = crisis/collapse.
    pub fn severity(self) -> u8 {
        match self {
            EquilibriumZone::Stable | EquilibriumZone::Equilibrium => 0,
            EquilibriumZone::Fragile
            | EquilibriumZone::UnderCapacity
            | EquilibriumZone::ElevatedStrain => 1,
            EquilibriumZone::Critical
            | EquilibriumZone::Stagnation
            | EquilibriumZone::CriticalStrain => 2,
            EquilibriumZone::Crisis | EquilibriumZone::Collapse | EquilibriumZone::Overload => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EquilibriumZone::Stable => "stable",
            EquilibriumZone::Fragile => "fragile",
            EquilibriumZone::Critical => "critical",
            EquilibriumZone::Crisis => "crisis",
            EquilibriumZone::Equilibrium => "equilibrium",
            EquilibriumZone::UnderCapacity => "under_capacity",
            EquilibriumZone::ElevatedStrain => "elevated_strain",
            EquilibriumZone::Stagnation => "stagnation",
            EquilibriumZone::CriticalStrain => "critical_strain",
            EquilibriumZone::Collapse => "collapse",
            EquilibriumZone::Overload => "overload",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EquilibriumZone::Stable => "System can absorb shocks",
            EquilibriumZone::Fragile => "Vulnerable to cascading failures",
            EquilibriumZone::Critical => "Approaching breakdown",
            EquilibriumZone::Crisis => "System capacity exceeded",
            EquilibriumZone::Equilibrium => "Strain matches capacity",
            EquilibriumZone::UnderCapacity => "Capacity idle, mild under-use",
            EquilibriumZone::ElevatedStrain => "Strain moderately above capacity",
            EquilibriumZone::Stagnation => "Capacity far from being used",
            EquilibriumZone::CriticalStrain => "Strain well above capacity",
            EquilibriumZone::Collapse => "Activity collapsed relative to capacity",
            EquilibriumZone::Overload => "Capacity overwhelmed",
        }
    }
}

impl fmt::Display for EquilibriumZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every composite index for one state vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// Weight Shift Index
    pub wsi: f64,
    /// TPC composite on the 1-7 scale
    pub tpc_score: f64,
    /// Amplifier in [0.8, 1.2]
    pub tpc_modifier: f64,
    pub adjusted_wsi: f64,
    pub effective_capacity: f64,
    /// Strain ratio: adjusted WSI over effective capacity
    pub theta: f64,
    /// Dual-pull balance W_acc = (T + P + C) - (R + S)
    pub dual_pull_balance: f64,
    /// Signal-inversion multiplier phi in (-1, 1)
    pub signal_multiplier: f64,
    /// Whether the signal-inversion condition applied to the payoffs
    pub signal_inverted: bool,
    /// Effective payoffs (strain penalty and inversion applied)
    pub payoffs: ActorPayoffs,
    /// Payoffs as a myopic actor sees them: no strain penalty, no inversion
    pub immediate_payoffs: ActorPayoffs,
    pub zone: EquilibriumZone,
}

impl DerivedMetrics {
    /// Theta above 1.0: strain exceeds absorptive capacity.
    pub fn threshold_crossed(&self) -> bool {
        self.theta > 1.0
    }
}
