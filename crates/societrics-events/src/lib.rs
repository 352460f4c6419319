//! Shared data types for the Societrics strain engine.
//!
//! This crate contains pure data structures with no simulation logic beyond
//! field clamping and validation. It is a dependency for all other crates in
//! the workspace.

pub mod field;
pub mod metrics;
pub mod record;
pub mod state;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

// Re-export field types
pub use field::{Domain, Field, FieldGroup, FieldMap};

// Re-export state types
pub use state::{OutOfDomain, StateVector};

// Re-export metric types
pub use metrics::{Actor, ActorPayoffs, DerivedMetrics, EquilibriumZone};

// Re-export record types
pub use record::{InterventionPhase, LogEntry, LogKind, StepRecord, UnknownPhase, NO_PHASE_LABEL};
