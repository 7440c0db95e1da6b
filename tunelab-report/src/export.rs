//! Artifact export — persists report structures for downstream tooling.
//!
//! The export layer is an adapter over the serialization boundary: it
//! writes what the calculators produced and recomputes nothing. Reports go
//! to a per-report directory keyed by the blake3 report id.

use anyhow::{Context, Result};
use chrono::DateTime;
use std::path::{Path, PathBuf};

use tunelab_core::{EquityPoint, ExitReason, TradeDirection, TradeRecord};

use crate::report::StrategyReport;

/// Artifact paths returned after export.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub report_json: PathBuf,
    pub trades_csv: PathBuf,
    pub equity_csv: PathBuf,
}

/// Write all artifacts for a report under `output_dir/<report_id>/`.
pub fn export_report(
    output_dir: impl AsRef<Path>,
    report: &StrategyReport,
    trades: &[TradeRecord],
    curve: &[EquityPoint],
) -> Result<ArtifactPaths> {
    let report_dir = output_dir.as_ref().join(report.report_id());
    std::fs::create_dir_all(&report_dir)
        .with_context(|| format!("Failed to create report directory {}", report_dir.display()))?;

    let report_json = report_dir.join("report.json");
    write_report_json(&report_json, report)?;

    let trades_csv = report_dir.join("trades.csv");
    write_trades_csv(&trades_csv, trades)?;

    let equity_csv = report_dir.join("equity.csv");
    write_equity_csv(&equity_csv, curve)?;

    Ok(ArtifactPaths {
        report_json,
        trades_csv,
        equity_csv,
    })
}

pub fn write_report_json(path: &Path, report: &StrategyReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report JSON {}", path.display()))?;
    Ok(())
}

pub fn write_trades_csv(path: &Path, trades: &[TradeRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create trades CSV {}", path.display()))?;

    writer.write_record([
        "id",
        "direction",
        "entry_time",
        "entry_price",
        "exit_time",
        "exit_price",
        "quantity",
        "pnl",
        "pnl_pct",
        "bars_held",
        "exit_reason",
    ])?;

    for trade in trades {
        writer.write_record(&[
            trade.id.to_string(),
            direction_label(trade.direction).to_string(),
            format_timestamp(trade.entry_time),
            format!("{:.4}", trade.entry_price),
            format_timestamp(trade.exit_time),
            format!("{:.4}", trade.exit_price),
            format!("{}", trade.quantity),
            format!("{:.4}", trade.pnl),
            format!("{:.6}", trade.pnl_pct),
            trade.bars_held.to_string(),
            exit_reason_label(trade.exit_reason).to_string(),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush trades CSV {}", path.display()))?;
    Ok(())
}

pub fn write_equity_csv(path: &Path, curve: &[EquityPoint]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create equity CSV {}", path.display()))?;

    writer.write_record(["timestamp", "equity", "drawdown_pct", "run_up_pct"])?;
    for point in curve {
        writer.write_record(&[
            format_timestamp(point.timestamp),
            format!("{:.4}", point.equity),
            format!("{:.6}", point.drawdown_pct),
            format!("{:.6}", point.run_up_pct),
        ])?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush equity CSV {}", path.display()))?;
    Ok(())
}

/// Unix seconds rendered as a UTC datetime; raw seconds if out of range.
fn format_timestamp(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        None => secs.to_string(),
    }
}

fn direction_label(direction: TradeDirection) -> &'static str {
    match direction {
        TradeDirection::Long => "LONG",
        TradeDirection::Short => "SHORT",
    }
}

fn exit_reason_label(reason: ExitReason) -> &'static str {
    match reason {
        ExitReason::Signal => "SIGNAL",
        ExitReason::StopLoss => "STOP_LOSS",
        ExitReason::TakeProfit => "TAKE_PROFIT",
        ExitReason::TrailingStop => "TRAILING_STOP",
        ExitReason::EndOfBacktest => "END_OF_BACKTEST",
    }
}
