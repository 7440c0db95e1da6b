//! Trade metrics — pure functions that compute performance reports.
//!
//! Every calculator is a pure function: trade list and/or equity curve in,
//! report struct out. No dependencies on the simulation engine; the curve's
//! drawdown/run-up fields are consumed as supplied, never recomputed.
//!
//! Sentinel `f64::INFINITY` results (profit factor with zero losses,
//! Calmar with zero drawdown) are intentional outputs and are passed
//! through unclamped.

use serde::{Deserialize, Serialize};
use tunelab_core::{EquityPoint, ExitReason, TradeDirection, TradeRecord};

use crate::config::AnalysisConfig;
use crate::ratios;
use crate::stats;

const SECS_PER_DAY: f64 = 86_400.0;

/// A metric split into total/long/short views.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Directional {
    pub total: f64,
    pub long: f64,
    pub short: f64,
}

/// A count split into total/long/short views.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectionalCount {
    pub total: usize,
    pub long: usize,
    pub short: usize,
}

/// Headline figures for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SummaryMetrics {
    pub total_pnl: f64,
    /// Fraction of trades with strictly positive P&L. Zero-P&L trades
    /// count as neither winners nor losers.
    pub win_rate: f64,
    /// Largest winning trade P&L; 0 if there were no winners.
    pub largest_win: f64,
    /// Largest losing trade P&L as a positive magnitude; 0 if no losers.
    pub largest_loss: f64,
    /// Maximum of the curve's per-point drawdown fractions.
    pub max_drawdown_pct: f64,
    /// Maximum of the curve's per-point run-up fractions.
    pub max_run_up_pct: f64,
    pub sharpe: f64,
    pub sortino: f64,
}

/// Profit decomposition by direction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DirectionalPerformance {
    pub net_profit: Directional,
    /// Sum of winning trades' P&L.
    pub gross_profit: Directional,
    /// Absolute sum of losing trades' P&L.
    pub gross_loss: Directional,
}

/// Winner/loser counts and win fractions by direction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TradeStatistics {
    pub trades: DirectionalCount,
    pub winners: DirectionalCount,
    pub losers: DirectionalCount,
    /// Winners over total per direction; 0 (not NaN) for directions with
    /// no trades.
    pub win_fraction: Directional,
}

/// Average and extreme trade P&L by direction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PnlAnalysis {
    pub avg_pnl: Directional,
    pub avg_win: Directional,
    /// Average losing trade as a positive magnitude.
    pub avg_loss: Directional,
    pub largest_win: Directional,
    /// Largest losing trade as a positive magnitude.
    pub largest_loss: Directional,
}

/// Average holding time in bars by direction and outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DurationAnalysis {
    pub avg_bars: Directional,
    pub avg_winning_bars: Directional,
    pub avg_losing_bars: Directional,
}

/// Risk and activity metrics beyond the headline summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdditionalMetrics {
    /// Gross profit over gross loss; `INFINITY` when there are no losses
    /// but some profit, 0 when there is no profit at all.
    pub profit_factor: f64,
    /// Total P&L per trade.
    pub expectancy: f64,
    /// Population standard deviation of daily returns.
    pub daily_volatility: f64,
    pub annualized_volatility: f64,
    /// Max drawdown fraction scaled by initial capital.
    pub max_drawdown_usd: f64,
    /// Longest contiguous span with drawdown fraction above 0, in the
    /// curve's time units (seconds), measured from the point preceding the
    /// drawdown's start to the point it returns to 0.
    pub max_drawdown_duration_secs: f64,
    pub cagr: f64,
    pub calmar: f64,
    pub trades_per_day: f64,
    pub exits_by_reason: ExitReasonCounts,
}

/// One bucket per `ExitReason` value, all present and zero-initialized.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExitReasonCounts {
    pub signal: usize,
    pub stop_loss: usize,
    pub take_profit: usize,
    pub trailing_stop: usize,
    pub end_of_backtest: usize,
}

impl ExitReasonCounts {
    pub fn record(&mut self, reason: ExitReason) {
        match reason {
            ExitReason::Signal => self.signal += 1,
            ExitReason::StopLoss => self.stop_loss += 1,
            ExitReason::TakeProfit => self.take_profit += 1,
            ExitReason::TrailingStop => self.trailing_stop += 1,
            ExitReason::EndOfBacktest => self.end_of_backtest += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.signal + self.stop_loss + self.take_profit + self.trailing_stop + self.end_of_backtest
    }
}

// ─── Calculators ─────────────────────────────────────────────────────

/// Headline summary. An empty trade list yields the all-zero struct.
pub fn summary_metrics(
    trades: &[TradeRecord],
    curve: &[EquityPoint],
    config: &AnalysisConfig,
) -> SummaryMetrics {
    if trades.is_empty() {
        return SummaryMetrics::default();
    }

    let winners = trades.iter().filter(|t| t.is_winner()).count();
    let returns = ratios::daily_returns(curve);

    SummaryMetrics {
        total_pnl: trades.iter().map(|t| t.pnl).sum(),
        win_rate: winners as f64 / trades.len() as f64,
        largest_win: trades
            .iter()
            .filter(|t| t.is_winner())
            .map(|t| t.pnl)
            .fold(0.0, f64::max),
        largest_loss: trades
            .iter()
            .filter(|t| t.is_loser())
            .map(|t| t.pnl.abs())
            .fold(0.0, f64::max),
        max_drawdown_pct: max_field(curve, |p| p.drawdown_pct),
        max_run_up_pct: max_field(curve, |p| p.run_up_pct),
        sharpe: ratios::sharpe_ratio(
            &returns,
            config.annual_risk_free_rate,
            config.periods_per_year,
        ),
        sortino: ratios::sortino_ratio(
            &returns,
            config.annual_risk_free_rate,
            config.sortino_target_return,
            config.periods_per_year,
        ),
    }
}

/// Net/gross profit decomposition split by direction.
pub fn directional_performance(trades: &[TradeRecord]) -> DirectionalPerformance {
    DirectionalPerformance {
        net_profit: by_direction(trades, |ts| ts.iter().map(|t| t.pnl).sum()),
        gross_profit: by_direction(trades, |ts| {
            ts.iter().filter(|t| t.is_winner()).map(|t| t.pnl).sum()
        }),
        gross_loss: by_direction(trades, |ts| {
            ts.iter()
                .filter(|t| t.is_loser())
                .map(|t| t.pnl.abs())
                .sum()
        }),
    }
}

/// Winner/loser counts and win fraction by direction.
pub fn trade_statistics(trades: &[TradeRecord]) -> TradeStatistics {
    let trades_count = count_by_direction(trades, |_| true);
    let winners = count_by_direction(trades, TradeRecord::is_winner);
    let losers = count_by_direction(trades, TradeRecord::is_loser);

    let fraction = |wins: usize, total: usize| {
        if total == 0 {
            0.0
        } else {
            wins as f64 / total as f64
        }
    };

    TradeStatistics {
        trades: trades_count,
        winners,
        losers,
        win_fraction: Directional {
            total: fraction(winners.total, trades_count.total),
            long: fraction(winners.long, trades_count.long),
            short: fraction(winners.short, trades_count.short),
        },
    }
}

/// Average and extreme P&L by direction. Empty subsets yield 0.
pub fn pnl_analysis(trades: &[TradeRecord]) -> PnlAnalysis {
    PnlAnalysis {
        avg_pnl: by_direction(trades, |ts| avg(ts.iter().map(|t| t.pnl))),
        avg_win: by_direction(trades, |ts| {
            avg(ts.iter().filter(|t| t.is_winner()).map(|t| t.pnl))
        }),
        avg_loss: by_direction(trades, |ts| {
            avg(ts.iter().filter(|t| t.is_loser()).map(|t| t.pnl.abs()))
        }),
        largest_win: by_direction(trades, |ts| {
            ts.iter()
                .filter(|t| t.is_winner())
                .map(|t| t.pnl)
                .fold(0.0, f64::max)
        }),
        largest_loss: by_direction(trades, |ts| {
            ts.iter()
                .filter(|t| t.is_loser())
                .map(|t| t.pnl.abs())
                .fold(0.0, f64::max)
        }),
    }
}

/// Average holding time in bars, overall and by outcome, by direction.
pub fn duration_analysis(trades: &[TradeRecord]) -> DurationAnalysis {
    DurationAnalysis {
        avg_bars: by_direction(trades, |ts| avg(ts.iter().map(|t| t.bars_held as f64))),
        avg_winning_bars: by_direction(trades, |ts| {
            avg(ts
                .iter()
                .filter(|t| t.is_winner())
                .map(|t| t.bars_held as f64))
        }),
        avg_losing_bars: by_direction(trades, |ts| {
            avg(ts
                .iter()
                .filter(|t| t.is_loser())
                .map(|t| t.bars_held as f64))
        }),
    }
}

/// Risk/activity metrics: profit factor, expectancy, volatility, drawdown
/// depth and duration, CAGR/Calmar, trade frequency, exit-reason counts.
pub fn additional_metrics(
    trades: &[TradeRecord],
    curve: &[EquityPoint],
    config: &AnalysisConfig,
) -> AdditionalMetrics {
    let gross_profit: f64 = trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl).sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.is_loser())
        .map(|t| t.pnl.abs())
        .sum();
    let total_pnl: f64 = trades.iter().map(|t| t.pnl).sum();

    let profit_factor = if gross_loss == 0.0 {
        if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        gross_profit / gross_loss
    };

    let expectancy = if trades.is_empty() {
        0.0
    } else {
        total_pnl / trades.len() as f64
    };

    let returns = ratios::daily_returns(curve);
    let daily_volatility = stats::std_dev(&returns);

    let max_dd_pct = max_field(curve, |p| p.drawdown_pct);
    let days = elapsed_days(curve);
    let growth = ratios::cagr(
        config.initial_capital,
        config.initial_capital + total_pnl,
        days / config.periods_per_year,
    );

    let mut exits = ExitReasonCounts::default();
    for trade in trades {
        exits.record(trade.exit_reason);
    }

    AdditionalMetrics {
        profit_factor,
        expectancy,
        daily_volatility,
        annualized_volatility: daily_volatility * config.periods_per_year.sqrt(),
        max_drawdown_usd: max_dd_pct * config.initial_capital,
        max_drawdown_duration_secs: max_drawdown_duration(curve),
        cagr: growth,
        calmar: ratios::calmar_ratio(growth, max_dd_pct),
        trades_per_day: if days > 0.0 {
            trades.len() as f64 / days
        } else {
            0.0
        },
        exits_by_reason: exits,
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn by_direction<F>(trades: &[TradeRecord], f: F) -> Directional
where
    F: Fn(&[&TradeRecord]) -> f64,
{
    let all: Vec<&TradeRecord> = trades.iter().collect();
    let long: Vec<&TradeRecord> = trades
        .iter()
        .filter(|t| t.direction == TradeDirection::Long)
        .collect();
    let short: Vec<&TradeRecord> = trades
        .iter()
        .filter(|t| t.direction == TradeDirection::Short)
        .collect();
    Directional {
        total: f(&all),
        long: f(&long),
        short: f(&short),
    }
}

fn count_by_direction<F>(trades: &[TradeRecord], f: F) -> DirectionalCount
where
    F: Fn(&TradeRecord) -> bool,
{
    let mut counts = DirectionalCount::default();
    for trade in trades {
        if f(trade) {
            counts.total += 1;
            match trade.direction {
                TradeDirection::Long => counts.long += 1,
                TradeDirection::Short => counts.short += 1,
            }
        }
    }
    counts
}

fn avg(values: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = values.collect();
    stats::mean(&collected)
}

fn max_field<F>(curve: &[EquityPoint], f: F) -> f64
where
    F: Fn(&EquityPoint) -> f64,
{
    curve.iter().map(f).fold(0.0, f64::max)
}

/// Elapsed days spanned by the equity curve; 0 for fewer than 2 points.
fn elapsed_days(curve: &[EquityPoint]) -> f64 {
    match (curve.first(), curve.last()) {
        (Some(first), Some(last)) if curve.len() >= 2 => {
            (last.timestamp - first.timestamp) as f64 / SECS_PER_DAY
        }
        _ => 0.0,
    }
}

/// Longest span with drawdown fraction above 0, anchored at the point
/// preceding the drawdown's start. An open drawdown at the end of the
/// curve counts through the final point.
fn max_drawdown_duration(curve: &[EquityPoint]) -> f64 {
    let mut max_span: i64 = 0;
    let mut start_ts: Option<i64> = None;

    for (i, point) in curve.iter().enumerate() {
        if point.drawdown_pct > 0.0 {
            if start_ts.is_none() {
                let anchor = if i > 0 {
                    curve[i - 1].timestamp
                } else {
                    point.timestamp
                };
                start_ts = Some(anchor);
            }
        } else if let Some(start) = start_ts.take() {
            max_span = max_span.max(point.timestamp - start);
        }
    }

    if let (Some(start), Some(last)) = (start_ts, curve.last()) {
        max_span = max_span.max(last.timestamp - start);
    }

    max_span as f64
}
