//! End-to-end pipeline test: simulation outputs → report → artifacts.

use tunelab_core::{
    ConditionSnapshot, ConditionType, DiagnosticEvent, EquityPoint, ExitReason, PositionState,
    TradeDirection, TradeRecord, TransitionReason,
};
use tunelab_report::{
    build_report, downsample, export_report, AnalysisConfig, DownsampleConfig,
    DownsampleStrategy, StrategyReport, SCHEMA_VERSION,
};

const SECS_PER_DAY: i64 = 86_400;

fn make_trade(id: u64, direction: TradeDirection, pnl: f64, exit_reason: ExitReason) -> TradeRecord {
    let entry_time = 1_700_000_000 + id as i64 * SECS_PER_DAY;
    TradeRecord {
        id,
        direction,
        entry_time,
        entry_price: 100.0,
        exit_time: entry_time + 6 * 3_600,
        exit_price: 100.0 + pnl / 50.0,
        quantity: 50.0,
        pnl,
        pnl_pct: pnl / 5_000.0,
        run_up: pnl.max(0.0),
        run_up_pct: pnl.max(0.0) / 5_000.0,
        drawdown: (-pnl).max(0.0),
        drawdown_pct: (-pnl).max(0.0) / 5_000.0,
        duration_secs: 6 * 3_600,
        bars_held: 6,
        cumulative_pnl: 0.0,
        equity_after: 0.0,
        exit_reason,
        stop_price: None,
        target_price: None,
    }
}

/// Equity curve with a mid-run dip, one point per day.
fn make_curve() -> Vec<EquityPoint> {
    let values = [
        10_000.0, 10_100.0, 10_000.0, 9_900.0, 10_050.0, 10_200.0, 10_300.0,
    ];
    let mut peak = f64::MIN;
    values
        .iter()
        .enumerate()
        .map(|(i, &equity)| {
            peak = peak.max(equity);
            EquityPoint {
                timestamp: 1_700_000_000 + i as i64 * SECS_PER_DAY,
                equity,
                drawdown_pct: (peak - equity) / peak,
                run_up_pct: 0.0,
            }
        })
        .collect()
}

fn make_events() -> Vec<DiagnosticEvent> {
    vec![
        DiagnosticEvent::IndicatorFlip {
            bar_index: 10,
            indicator_key: "rsi_14".into(),
            indicator_type: "rsi".into(),
            condition: ConditionType::LongEntry,
            required: true,
            previous_value: false,
            new_value: true,
            snapshot: ConditionSnapshot {
                distance_from_trigger: 0,
            },
        },
        DiagnosticEvent::ConditionChange {
            bar_index: 10,
            condition: ConditionType::LongEntry,
            new_state: true,
            triggering_indicator: Some("rsi_14".into()),
        },
        DiagnosticEvent::StateTransition {
            bar_index: 10,
            from: PositionState::Cash,
            to: PositionState::Long,
            reason: None,
        },
        DiagnosticEvent::StateTransition {
            bar_index: 60,
            from: PositionState::Long,
            to: PositionState::Cash,
            reason: Some(TransitionReason::TakeProfit),
        },
    ]
}

#[test]
fn full_pipeline_produces_coherent_report() {
    let trades = vec![
        make_trade(1, TradeDirection::Long, 100.0, ExitReason::TakeProfit),
        make_trade(2, TradeDirection::Long, -30.0, ExitReason::StopLoss),
        make_trade(3, TradeDirection::Short, 50.0, ExitReason::Signal),
        make_trade(4, TradeDirection::Short, -20.0, ExitReason::Signal),
    ];
    let curve = make_curve();
    let events = make_events();
    let config = AnalysisConfig {
        total_bars: 144,
        ..AnalysisConfig::default()
    };

    let report = build_report(&trades, &curve, &events, &config);

    // Summary matches the hand-computed figures.
    assert!((report.summary.total_pnl - 100.0).abs() < 1e-10);
    assert!((report.summary.win_rate - 0.5).abs() < 1e-10);
    assert!((report.summary.largest_win - 100.0).abs() < 1e-10);
    assert!((report.summary.largest_loss - 30.0).abs() < 1e-10);
    assert!(report.summary.sharpe.is_finite());

    // Identities across sections.
    assert!(
        (report.summary.total_pnl - report.performance.net_profit.total).abs() < 1e-10
    );
    assert!(
        (report.performance.net_profit.total
            - (report.performance.gross_profit.total - report.performance.gross_loss.total))
            .abs()
            < 1e-10
    );

    // Diagnostics picked up the events.
    assert_eq!(report.algo.condition_triggers.long_entry, 1);
    assert_eq!(report.algo.exits_by_reason.take_profit, 1);
    assert_eq!(report.algo.indicator_analyses.len(), 1);
    assert_eq!(report.algo.state_distribution.bars_in_long, 50);

    // Trade-level exit reasons are tracked independently of transitions.
    assert_eq!(report.additional.exits_by_reason.signal, 2);
    assert_eq!(report.additional.exits_by_reason.stop_loss, 1);
}

#[test]
fn report_round_trips_through_json() {
    let trades = vec![
        make_trade(1, TradeDirection::Long, 100.0, ExitReason::Signal),
        make_trade(2, TradeDirection::Short, -40.0, ExitReason::StopLoss),
    ];
    let curve = make_curve();
    let config = AnalysisConfig {
        total_bars: 144,
        ..AnalysisConfig::default()
    };
    let report = build_report(&trades, &curve, &make_events(), &config);

    let json = serde_json::to_string_pretty(&report).unwrap();
    let deser: StrategyReport = serde_json::from_str(&json).unwrap();
    assert_eq!(deser, report);
    assert_eq!(deser.schema_version, SCHEMA_VERSION);
}

#[test]
fn export_then_downsample_is_order_independent() {
    let trades = vec![
        make_trade(1, TradeDirection::Long, 100.0, ExitReason::Signal),
        make_trade(2, TradeDirection::Short, -40.0, ExitReason::StopLoss),
    ];
    let curve = make_curve();
    let config = AnalysisConfig {
        total_bars: 144,
        downsample: DownsampleConfig {
            strategy: DownsampleStrategy::Lttb,
            target_points: 5,
        },
        ..AnalysisConfig::default()
    };

    // Metrics read the full raw curve, so reports built before and after
    // downsampling the stored copy are identical.
    let report_before = build_report(&trades, &curve, &[], &config);
    let stored = downsample(&curve, &config.downsample);
    let report_after = build_report(&trades, &curve, &[], &config);
    assert_eq!(report_before, report_after);

    assert_eq!(stored.len(), 5);
    assert_eq!(stored[0], curve[0]);
    assert_eq!(*stored.last().unwrap(), *curve.last().unwrap());

    let dir = tempfile::tempdir().unwrap();
    let paths = export_report(dir.path(), &report_before, &trades, &stored).unwrap();
    assert!(paths.report_json.exists());
    assert!(paths.trades_csv.exists());
    assert!(paths.equity_csv.exists());

    let equity_text = std::fs::read_to_string(&paths.equity_csv).unwrap();
    // Header plus the 5 downsampled rows.
    assert_eq!(equity_text.lines().count(), 6);
}
