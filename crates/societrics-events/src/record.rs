//! History Records
//!
//! Per-step records and the activation log appended by a running scenario.
//! Both are append-only: once written, a record is never modified.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::metrics::DerivedMetrics;
use crate::state::StateVector;

/// Label used in output when no intervention phase is active.
pub const NO_PHASE_LABEL: &str = "initial";

/// The three ordered policy interventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionPhase {
    /// Phase 1: reduce coercion and social pressure to stop feedback loops
    #[serde(alias = "circuitBreaker")]
    CircuitBreaker,
    /// Phase 2: stabilize institutions and expand system capacity
    #[serde(alias = "structuralFloor")]
    StructuralFloor,
    /// Phase 3: empower individual agency and rebuild trust
    #[serde(alias = "incentiveEngine")]
    IncentiveEngine,
}

impl InterventionPhase {
    pub const ALL: [InterventionPhase; 3] = [
        InterventionPhase::CircuitBreaker,
        InterventionPhase::StructuralFloor,
        InterventionPhase::IncentiveEngine,
    ];

    pub fn id(self) -> &'static str {
        match self {
            InterventionPhase::CircuitBreaker => "circuit_breaker",
            InterventionPhase::StructuralFloor => "structural_floor",
            InterventionPhase::IncentiveEngine => "incentive_engine",
        }
    }

    /// 1-based position in the sequence.
    pub fn order(self) -> u8 {
        match self {
            InterventionPhase::CircuitBreaker => 1,
            InterventionPhase::StructuralFloor => 2,
            InterventionPhase::IncentiveEngine => 3,
        }
    }

    /// The phase that may follow this one. `None` once the sequence is complete.
    pub fn next(self) -> Option<InterventionPhase> {
        match self {
            InterventionPhase::CircuitBreaker => Some(InterventionPhase::StructuralFloor),
            InterventionPhase::StructuralFloor => Some(InterventionPhase::IncentiveEngine),
            InterventionPhase::IncentiveEngine => None,
        }
    }

    /// The phase eligible after `current` (the first phase when nothing is active).
    pub fn next_after(current: Option<InterventionPhase>) -> Option<InterventionPhase> {
        match current {
            None => Some(InterventionPhase::CircuitBreaker),
            Some(phase) => phase.next(),
        }
    }

    /// Output label for an optional phase.
    pub fn label(phase: Option<InterventionPhase>) -> &'static str {
        phase.map(InterventionPhase::id).unwrap_or(NO_PHASE_LABEL)
    }
}

impl fmt::Display for InterventionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when a string names no phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPhase(pub String);

impl fmt::Display for UnknownPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown intervention phase: {}", self.0)
    }
}

impl std::error::Error for UnknownPhase {}

impl FromStr for InterventionPhase {
    type Err = UnknownPhase;

    /// Accepts snake_case ids and the camelCase ids used by the dashboards.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "circuit_breaker" | "circuitBreaker" => Ok(InterventionPhase::CircuitBreaker),
            "structural_floor" | "structuralFloor" => Ok(InterventionPhase::StructuralFloor),
            "incentive_engine" | "incentiveEngine" => Ok(InterventionPhase::IncentiveEngine),
            other => Err(UnknownPhase(other.to_string())),
        }
    }
}

/// One completed step: the state after the step and its metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    /// 0-based index of the step that produced this record
    pub step: u64,
    /// Phase active while the step ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<InterventionPhase>,
    /// Shocks active while the step ran, in activation order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_shocks: Vec<String>,
    pub state: StateVector,
    pub metrics: DerivedMetrics,
}

impl StepRecord {
    pub fn phase_label(&self) -> &'static str {
        InterventionPhase::label(self.phase)
    }

    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// What kind of activation a log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Shock,
    Intervention,
}

/// A shock or phase activation, stamped with the elapsed step count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub step: u64,
    pub kind: LogKind,
    pub id: String,
    pub name: String,
}

impl LogEntry {
    pub fn new(step: u64, kind: LogKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            step,
            kind,
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    /// `shock:International Sanctions@T12`, the dashboards' event-log notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            LogKind::Shock => "shock",
            LogKind::Intervention => "intervention",
        };
        write!(f, "{}:{}@T{}", kind, self.name, self.step)
    }
}
