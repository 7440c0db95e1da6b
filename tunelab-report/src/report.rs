//! Report assembly — wires the calculators into one result structure.

use serde::{Deserialize, Serialize};
use tunelab_core::{DiagnosticEvent, EquityPoint, TradeRecord};

use crate::config::AnalysisConfig;
use crate::diagnostics::{analyze_events, AlgoMetrics};
use crate::metrics::{
    additional_metrics, directional_performance, duration_analysis, pnl_analysis,
    summary_metrics, trade_statistics, AdditionalMetrics, DirectionalPerformance,
    DurationAnalysis, PnlAnalysis, SummaryMetrics, TradeStatistics,
};

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete analysis output for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub summary: SummaryMetrics,
    pub performance: DirectionalPerformance,
    pub trade_stats: TradeStatistics,
    pub pnl: PnlAnalysis,
    pub durations: DurationAnalysis,
    pub additional: AdditionalMetrics,
    pub algo: AlgoMetrics,
}

/// Default schema version for serde deserialization of older JSON without
/// the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl StrategyReport {
    /// Content-addressable id for this report.
    ///
    /// Two identical reports hash to the same id, so exports can be
    /// deduplicated and cached by id.
    pub fn report_id(&self) -> String {
        let json = serde_json::to_string(self).expect("StrategyReport serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

/// Build the full report from a run's collected outputs.
///
/// Trade, equity, and event inputs are read-only; the performance and
/// diagnostic sections are computed independently of each other.
pub fn build_report(
    trades: &[TradeRecord],
    curve: &[EquityPoint],
    events: &[DiagnosticEvent],
    config: &AnalysisConfig,
) -> StrategyReport {
    StrategyReport {
        schema_version: SCHEMA_VERSION,
        summary: summary_metrics(trades, curve, config),
        performance: directional_performance(trades),
        trade_stats: trade_statistics(trades),
        pnl: pnl_analysis(trades),
        durations: duration_analysis(trades),
        additional: additional_metrics(trades, curve, config),
        algo: analyze_events(events, config.total_bars),
    }
}
