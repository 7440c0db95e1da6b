//! TradeRecord — a completed round-trip trade with P&L and excursions.

use serde::{Deserialize, Serialize};

/// A complete round-trip trade record: entry → exit.
///
/// Produced by the simulation once a position closes; immutable afterwards.
/// Prices and P&L are in account currency, fractional fields are relative
/// to position size at entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    // ── Identification ──
    /// Sequential trade id, 1-based in entry order.
    pub id: u64,
    pub direction: TradeDirection,

    // ── Entry ──
    /// Entry time in seconds since the Unix epoch.
    pub entry_time: i64,
    pub entry_price: f64,

    // ── Exit ──
    /// Exit time in seconds since the Unix epoch.
    pub exit_time: i64,
    pub exit_price: f64,

    // ── Size ──
    pub quantity: f64,

    // ── PnL ──
    pub pnl: f64,
    /// Realized P&L as a fraction of position size at entry.
    pub pnl_pct: f64,

    // ── Excursion ──
    /// Best unrealized gain during the trade, in currency.
    pub run_up: f64,
    /// Best unrealized gain as a fraction of position size.
    pub run_up_pct: f64,
    /// Worst unrealized loss during the trade, in currency (positive magnitude).
    pub drawdown: f64,
    /// Worst unrealized loss as a fraction of position size.
    pub drawdown_pct: f64,

    // ── Duration ──
    pub duration_secs: i64,
    pub bars_held: usize,

    // ── Running totals ──
    /// Cumulative realized P&L including this trade.
    pub cumulative_pnl: f64,
    /// Account equity immediately after this trade closed.
    pub equity_after: f64,

    // ── Exit context ──
    pub exit_reason: ExitReason,
    /// Configured stop price, if a stop was active.
    pub stop_price: Option<f64>,
    /// Configured take-profit price, if a target was active.
    pub target_price: Option<f64>,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.pnl < 0.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeDirection {
    Long,
    Short,
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    Signal,
    StopLoss,
    TakeProfit,
    TrailingStop,
    EndOfBacktest,
}
