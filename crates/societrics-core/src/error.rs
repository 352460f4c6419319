//! Engine Errors
//!
//! Every failure a scenario operation can report. All of them are local and
//! recoverable: the scenario is left exactly as it was before the call.

use societrics_events::{InterventionPhase, OutOfDomain};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(
        "cannot apply phase {requested}: current phase is {}, next eligible is {}",
        phase_name(.current),
        phase_name(.next_eligible)
    )]
    InvalidPhaseTransition {
        requested: InterventionPhase,
        current: Option<InterventionPhase>,
        next_eligible: Option<InterventionPhase>,
    },

    #[error("unknown shock or phase id: {0}")]
    UnknownShockOrPhaseId(String),

    #[error("domain violation in {quantity}: {value} ({reason})")]
    DomainViolation {
        quantity: String,
        value: f64,
        reason: String,
    },
}

fn phase_name(phase: &Option<InterventionPhase>) -> &'static str {
    match phase {
        Some(p) => p.id(),
        None => "none",
    }
}

impl EngineError {
    pub fn domain(quantity: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        EngineError::DomainViolation {
            quantity: quantity.into(),
            value,
            reason: reason.into(),
        }
    }
}

impl From<OutOfDomain> for EngineError {
    fn from(err: OutOfDomain) -> Self {
        EngineError::domain(
            err.field.name(),
            err.value,
            format!("outside [{}, {}]", err.domain.min, err.domain.max),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use societrics_events::{Domain, Field};

    #[test]
    fn test_invalid_transition_message() {
        let err = EngineError::InvalidPhaseTransition {
            requested: InterventionPhase::StructuralFloor,
            current: None,
            next_eligible: Some(InterventionPhase::CircuitBreaker),
        };
        assert_eq!(
            err.to_string(),
            "cannot apply phase structural_floor: current phase is none, next eligible is circuit_breaker"
        );
    }

    #[test]
    fn test_from_out_of_domain() {
        let err: EngineError = OutOfDomain {
            field: Field::Soc,
            value: 0.0,
            domain: Domain::new(0.02, 1.0),
        }
        .into();

        match err {
            EngineError::DomainViolation { quantity, value, .. } => {
                assert_eq!(quantity, "soc");
                assert_eq!(value, 0.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
