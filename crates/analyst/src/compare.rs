//! Scenario Comparison
//!
//! Side-by-side summary of two independently advanced scenarios, such as a
//! baseline run and the same preset under an intervention plan.

use serde::{Deserialize, Serialize};
use societrics_events::{LogEntry, StepRecord};

use crate::stats::RunStatistics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub baseline: RunStatistics,
    pub alternative: RunStatistics,
    /// Alternative minus baseline
    pub final_theta_delta: f64,
    pub mean_theta_delta: f64,
    pub crisis_steps_delta: i64,
    pub trust_change_delta: f64,
}

impl ScenarioComparison {
    pub fn new(
        baseline: &[StepRecord],
        baseline_log: &[LogEntry],
        alternative: &[StepRecord],
        alternative_log: &[LogEntry],
    ) -> Self {
        Self::from_statistics(
            RunStatistics::from_history(baseline, baseline_log),
            RunStatistics::from_history(alternative, alternative_log),
        )
    }

    pub fn from_statistics(baseline: RunStatistics, alternative: RunStatistics) -> Self {
        Self {
            final_theta_delta: alternative.final_theta - baseline.final_theta,
            mean_theta_delta: alternative.mean_theta - baseline.mean_theta,
            crisis_steps_delta: alternative.steps_in_crisis as i64
                - baseline.steps_in_crisis as i64,
            trust_change_delta: alternative.trust_change_points - baseline.trust_change_points,
            baseline,
            alternative,
        }
    }

    /// The alternative ends with less strain than the baseline.
    pub fn alternative_improves(&self) -> bool {
        self.final_theta_delta < 0.0
    }
}
