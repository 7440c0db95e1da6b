//! EquityPoint — one sample of portfolio value over time.

use serde::{Deserialize, Serialize};

/// Single point in the equity curve.
///
/// Drawdown and run-up fractions are precomputed upstream relative to the
/// running peak/trough up to and including this point; both are
/// non-negative. The report layer reads them as-is and never recomputes
/// them (daily-return derivation works on `equity` alone).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EquityPoint {
    /// Sample time in seconds since the Unix epoch. Points are
    /// time-ordered but may be irregularly spaced.
    pub timestamp: i64,
    /// Portfolio value in account currency.
    pub equity: f64,
    /// Fractional decline from the running equity peak.
    pub drawdown_pct: f64,
    /// Fractional rise from the running equity trough.
    pub run_up_pct: f64,
}
