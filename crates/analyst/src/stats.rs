//! Run Statistics
//!
//! Summary numbers over a scenario's history and activation log.

use serde::{Deserialize, Serialize};
use societrics_events::{LogEntry, LogKind, StepRecord};

/// Records per zone severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDistribution {
    pub settled: usize,  // severity 0
    pub strained: usize, // severity 1
    pub critical: usize, // severity 2
    pub crisis: usize,   // severity 3
}

/// Overall run statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub steps: usize,
    pub mean_theta: f64,
    pub max_theta: f64,
    pub min_theta: f64,
    pub final_theta: f64,
    /// Records with theta above 1.0
    pub steps_in_crisis: usize,
    /// Final minus first trust, in percentage points
    pub trust_change_points: f64,
    /// Relative wealth change from the first record, in percent
    pub wealth_change_percent: f64,
    pub interventions: usize,
    pub shocks: usize,
    pub zones: ZoneDistribution,
}

impl RunStatistics {
    /// Summarizes a history. An empty history gives all-zero statistics
    /// apart from the activation counts.
    pub fn from_history(history: &[StepRecord], log: &[LogEntry]) -> Self {
        let interventions = log
            .iter()
            .filter(|entry| entry.kind == LogKind::Intervention)
            .count();
        let shocks = log.iter().filter(|entry| entry.kind == LogKind::Shock).count();

        let (Some(first), Some(last)) = (history.first(), history.last()) else {
            return Self {
                interventions,
                shocks,
                ..Self::default()
            };
        };

        let mut theta_sum = 0.0;
        let mut max_theta = f64::NEG_INFINITY;
        let mut min_theta = f64::INFINITY;
        let mut steps_in_crisis = 0;
        let mut zones = ZoneDistribution::default();

        for record in history {
            let theta = record.metrics.theta;
            theta_sum += theta;
            max_theta = max_theta.max(theta);
            min_theta = min_theta.min(theta);
            if record.metrics.threshold_crossed() {
                steps_in_crisis += 1;
            }
            match record.metrics.zone.severity() {
                0 => zones.settled += 1,
                1 => zones.strained += 1,
                2 => zones.critical += 1,
                _ => zones.crisis += 1,
            }
        }

        Self {
            steps: history.len(),
            mean_theta: theta_sum / history.len() as f64,
            max_theta,
            min_theta,
            final_theta: last.metrics.theta,
            steps_in_crisis,
            trust_change_points: (last.state.trust - first.state.trust) * 100.0,
            wealth_change_percent: (last.state.wealth - first.state.wealth) / first.state.wealth
                * 100.0,
            interventions,
            shocks,
            zones,
        }
    }

    pub fn crisis_share(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.steps_in_crisis as f64 / self.steps as f64
        }
    }
}
