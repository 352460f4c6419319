//! Analyst: reporting over Societrics scenario histories.
//!
//! The analyst reads what the engine produced (step records, the activation
//! log, the latest metrics) and never feeds anything back.
//!
//! # Modules
//!
//! - [`equilibrium`]: Static versus model-consistent equilibrium readings
//! - [`stats`]: Theta, crisis and trend statistics for a run
//! - [`export`]: Flat per-step rows for table writers
//! - [`compare`]: Side-by-side summary of two runs

pub mod compare;
pub mod config;
pub mod equilibrium;
pub mod export;
pub mod stats;

// Re-export equilibrium types
pub use equilibrium::{
    mean_theta, AnalyzerConfig, Conditions, EquilibriumAnalysis, EquilibriumAnalyzer,
    EquilibriumLabel, ModelPrediction, StaticPrediction, BREAKDOWN_SEVERITY, STATIC_OUTCOME,
};

// Re-export config types
pub use config::{default_config_toml, AnalystConfig, ConfigError};

pub use compare::ScenarioComparison;
pub use export::{export_rows, ExportRow};
pub use stats::{RunStatistics, ZoneDistribution};

use serde::{Deserialize, Serialize};
use societrics_events::{DerivedMetrics, InterventionPhase, LogEntry, StepRecord};
use std::path::Path;
use tracing::debug;

/// Everything the analyst reports about one scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub statistics: RunStatistics,
    pub equilibrium: EquilibriumAnalysis,
}

/// Entry point combining the analyzer and the statistics.
#[derive(Debug, Clone, Default)]
pub struct Analyst {
    config: AnalystConfig,
    analyzer: EquilibriumAnalyzer,
}

impl Analyst {
    pub fn new(config: AnalystConfig) -> Self {
        let analyzer = EquilibriumAnalyzer::new(config.analyzer.clone());
        Self { config, analyzer }
    }

    pub fn from_config_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::new(AnalystConfig::from_file(path)?))
    }

    pub fn config(&self) -> &AnalystConfig {
        &self.config
    }

    /// Reports on the latest metrics, using the full history for the
    /// structural condition and the statistics.
    pub fn report(
        &self,
        metrics: &DerivedMetrics,
        phase: Option<InterventionPhase>,
        history: &[StepRecord],
        log: &[LogEntry],
    ) -> AnalysisReport {
        let statistics = RunStatistics::from_history(history, log);
        let equilibrium = self.analyzer.analyze(metrics, phase, Some(history));
        debug!(
            label = %equilibrium.model_prediction.label,
            steps = statistics.steps,
            "analysis complete"
        );
        AnalysisReport {
            statistics,
            equilibrium,
        }
    }
}
