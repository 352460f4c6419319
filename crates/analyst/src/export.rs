//! Export Rows
//!
//! Flat per-step rows carrying the columns a table or CSV writer needs.
//! Formatting the rows is left to the consumer.

use serde::{Deserialize, Serialize};
use societrics_events::StepRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub step: u64,
    pub wsi: f64,
    pub tpc_score: f64,
    pub tpc_modifier: f64,
    pub adjusted_wsi: f64,
    pub effective_capacity: f64,
    pub theta: f64,
    pub w_acc: f64,
    pub phi: f64,
    pub regime_payoff: f64,
    pub opposition_payoff: f64,
    pub population_payoff: f64,
    pub zone: String,
    pub trust: f64,
    pub wealth: f64,
    pub education: f64,
    pub personal_agency: f64,
    /// Active phase id, or "initial"
    pub phase: String,
}

impl ExportRow {
    /// Column names in field order.
    pub const COLUMNS: [&'static str; 18] = [
        "step",
        "wsi",
        "tpc_score",
        "tpc_modifier",
        "adjusted_wsi",
        "effective_capacity",
        "theta",
        "w_acc",
        "phi",
        "regime_payoff",
        "opposition_payoff",
        "population_payoff",
        "zone",
        "trust",
        "wealth",
        "education",
        "personal_agency",
        "phase",
    ];

    pub fn from_record(record: &StepRecord) -> Self {
        let metrics = &record.metrics;
        Self {
            step: record.step,
            wsi: metrics.wsi,
            tpc_score: metrics.tpc_score,
            tpc_modifier: metrics.tpc_modifier,
            adjusted_wsi: metrics.adjusted_wsi,
            effective_capacity: metrics.effective_capacity,
            theta: metrics.theta,
            w_acc: metrics.dual_pull_balance,
            phi: metrics.signal_multiplier,
            regime_payoff: metrics.payoffs.regime,
            opposition_payoff: metrics.payoffs.opposition,
            population_payoff: metrics.payoffs.population,
            zone: metrics.zone.label().to_string(),
            trust: record.state.trust,
            wealth: record.state.wealth,
            education: record.state.education,
            personal_agency: record.state.personal_agency,
            phase: record.phase_label().to_string(),
        }
    }
}

/// One row per history record, in order.
pub fn export_rows(history: &[StepRecord]) -> Vec<ExportRow> {
    history.iter().map(ExportRow::from_record).collect()
}
