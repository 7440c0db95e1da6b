//! TuneLab Report — performance metrics and tuning diagnostics.
//!
//! This crate builds on `tunelab-core` to turn a simulation's collected
//! outputs into report structures:
//! - Numeric kernel (sum/mean/population std-dev)
//! - Financial ratio math (daily returns, Sharpe, Sortino, CAGR, Calmar)
//! - Trade metrics (summary, directional splits, P&L, durations, risk)
//! - Algo diagnostics (indicator usefulness, near misses, state time)
//! - Equity curve downsampling (LTTB and drawdown-peak strategies)
//! - Report assembly with content-addressed ids and artifact export
//!
//! Everything is a pure, synchronous function over in-memory slices; the
//! only I/O lives in the export adapters.

pub mod config;
pub mod diagnostics;
pub mod downsample;
pub mod export;
pub mod metrics;
pub mod ratios;
pub mod report;
pub mod stats;

pub use config::{AnalysisConfig, ConfigError};
pub use diagnostics::{
    analyze_events, AlgoMetrics, ApproachSequence, ConditionTriggerCounts, EventCounts,
    IndicatorAnalysis, NearMissAnalysis, StateDistribution,
};
pub use downsample::{downsample, DownsampleConfig, DownsampleStrategy};
pub use export::{export_report, ArtifactPaths};
pub use metrics::{
    AdditionalMetrics, Directional, DirectionalCount, DirectionalPerformance, DurationAnalysis,
    ExitReasonCounts, PnlAnalysis, SummaryMetrics, TradeStatistics,
};
pub use ratios::{DEFAULT_RISK_FREE_RATE, PERIODS_PER_YEAR};
pub use report::{build_report, StrategyReport, SCHEMA_VERSION};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<StrategyReport>();
        assert_sync::<StrategyReport>();
        assert_send::<SummaryMetrics>();
        assert_sync::<SummaryMetrics>();
        assert_send::<AdditionalMetrics>();
        assert_sync::<AdditionalMetrics>();
    }

    #[test]
    fn diagnostic_types_are_send_sync() {
        assert_send::<AlgoMetrics>();
        assert_sync::<AlgoMetrics>();
        assert_send::<IndicatorAnalysis>();
        assert_sync::<IndicatorAnalysis>();
        assert_send::<NearMissAnalysis>();
        assert_sync::<NearMissAnalysis>();
        assert_send::<StateDistribution>();
        assert_sync::<StateDistribution>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<AnalysisConfig>();
        assert_sync::<AnalysisConfig>();
        assert_send::<DownsampleConfig>();
        assert_sync::<DownsampleConfig>();
    }
}
