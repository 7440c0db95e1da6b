//! Financial ratio math — daily returns, Sharpe, Sortino, CAGR, Calmar.
//!
//! Annualization uses 365 periods per year: the simulated markets trade
//! 24/7, so the traditional 252-day convention does not apply. Callers
//! override the base through the explicit parameter, never by substituting
//! a different constant.
//!
//! Zero-variance ratios with a strictly positive mean excess return yield
//! `f64::INFINITY` — a deliberate sentinel, not an error, and downstream
//! consumers must preserve it exactly.

use tunelab_core::EquityPoint;

use crate::stats;

/// Annualization base: days per year in a 24/7 market.
pub const PERIODS_PER_YEAR: f64 = 365.0;

/// Default annual risk-free rate (report convention).
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.0;

const SECS_PER_DAY: i64 = 86_400;

/// Derive one return per calendar day from an equity curve.
///
/// Points are bucketed by `floor(timestamp / 86400)`. A day's return is
/// `(day_end − day_start) / day_start`, where day-start equity is the last
/// equity value of the previous day. The opening day is partial (we joined
/// mid-day), so its movement seeds the next day's start instead of
/// producing a return; the final partial day contributes a return only if
/// its equity differs from its start. Fewer than 2 points yields an empty
/// sequence.
pub fn daily_returns(points: &[EquityPoint]) -> Vec<f64> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut returns = Vec::new();
    let mut current_day = points[0].timestamp.div_euclid(SECS_PER_DAY);
    // Day-start equity; for the opening day this is the first observed value.
    let mut day_start = points[0].equity;
    let mut last = points[0].equity;
    let mut opening_day = true;

    for point in &points[1..] {
        let day = point.timestamp.div_euclid(SECS_PER_DAY);
        if day != current_day {
            if !opening_day {
                returns.push((last - day_start) / day_start);
            }
            day_start = last;
            opening_day = false;
            current_day = day;
        }
        last = point.equity;
    }

    if last != day_start {
        returns.push((last - day_start) / day_start);
    }

    returns
}

/// Convert an annual rate to a per-period rate:
/// `(1 + annual)^(1/periods_per_year) − 1`. Returns 0 if
/// `periods_per_year <= 0`.
pub fn annual_to_period_rate(annual_rate: f64, periods_per_year: f64) -> f64 {
    if periods_per_year <= 0.0 {
        return 0.0;
    }
    (1.0 + annual_rate).powf(1.0 / periods_per_year) - 1.0
}

/// Annualized Sharpe ratio from daily returns.
///
/// Sharpe = mean(excess) / pop_std(excess) * sqrt(periods_per_year), with
/// excess returns taken against the per-period risk-free rate. Fewer than
/// 2 returns yields 0. Zero deviation yields `INFINITY` when the mean
/// excess is positive, else 0.
pub fn sharpe_ratio(daily: &[f64], annual_risk_free: f64, periods_per_year: f64) -> f64 {
    if daily.len() < 2 {
        return 0.0;
    }
    let period_rf = annual_to_period_rate(annual_risk_free, periods_per_year);
    let excess: Vec<f64> = daily.iter().map(|r| r - period_rf).collect();
    let m = stats::mean(&excess);
    let sd = stats::std_dev(&excess);
    if sd == 0.0 {
        return if m > 0.0 { f64::INFINITY } else { 0.0 };
    }
    (m / sd) * periods_per_year.sqrt()
}

/// Annualized Sortino ratio from daily returns.
///
/// Same numerator as Sharpe; the denominator is downside deviation
/// `sqrt(sum(min(0, r − target)²) / N)` over ALL N returns (non-negative
/// shortfalls contribute 0). Same minimum-sample and sentinel rules as
/// Sharpe, same annualization factor.
pub fn sortino_ratio(
    daily: &[f64],
    annual_risk_free: f64,
    target_return: f64,
    periods_per_year: f64,
) -> f64 {
    if daily.len() < 2 {
        return 0.0;
    }
    let period_rf = annual_to_period_rate(annual_risk_free, periods_per_year);
    let excess: Vec<f64> = daily.iter().map(|r| r - period_rf).collect();
    let m = stats::mean(&excess);

    let downside_var = daily
        .iter()
        .map(|r| (r - target_return).min(0.0).powi(2))
        .sum::<f64>()
        / daily.len() as f64;
    let downside_dev = downside_var.sqrt();

    if downside_dev == 0.0 {
        return if m > 0.0 { f64::INFINITY } else { 0.0 };
    }
    (m / downside_dev) * periods_per_year.sqrt()
}

/// Compound annual growth rate: `(end/start)^(1/years) − 1`.
///
/// Returns 0 if `years <= 0` or either equity is non-positive.
pub fn cagr(start_equity: f64, end_equity: f64, years: f64) -> f64 {
    if years <= 0.0 || start_equity <= 0.0 || end_equity <= 0.0 {
        return 0.0;
    }
    (end_equity / start_equity).powf(1.0 / years) - 1.0
}

/// Calmar ratio: CAGR / |max drawdown fraction|.
///
/// Zero drawdown yields `INFINITY` when CAGR is positive, else 0.
pub fn calmar_ratio(cagr: f64, max_drawdown_fraction: f64) -> f64 {
    if max_drawdown_fraction == 0.0 {
        return if cagr > 0.0 { f64::INFINITY } else { 0.0 };
    }
    cagr / max_drawdown_fraction.abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(timestamp: i64, equity: f64) -> EquityPoint {
        EquityPoint {
            timestamp,
            equity,
            drawdown_pct: 0.0,
            run_up_pct: 0.0,
        }
    }

    /// One point per day starting at midnight of day 0.
    fn daily_curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &eq)| point(i as i64 * SECS_PER_DAY, eq))
            .collect()
    }

    // ── Daily returns ──

    #[test]
    fn daily_returns_one_point_per_day() {
        let curve = daily_curve(&[10_000.0, 10_100.0, 10_000.0, 10_200.0, 10_300.0]);
        let returns = daily_returns(&curve);
        assert_eq!(returns.len(), 4);
        assert!((returns[0] - 0.01).abs() < 1e-10);
        assert!((returns[1] - (10_000.0 - 10_100.0) / 10_100.0).abs() < 1e-10);
        assert!((returns[2] - 0.02).abs() < 1e-10);
        assert!((returns[3] - (10_300.0 - 10_200.0) / 10_200.0).abs() < 1e-10);
    }

    #[test]
    fn daily_returns_sub_daily_sampling_uses_day_closes() {
        // Two intraday samples per day; only the day closes matter.
        let curve = vec![
            point(0, 10_000.0),
            point(3_600, 10_050.0),
            point(SECS_PER_DAY, 10_080.0),
            point(SECS_PER_DAY + 3_600, 10_100.0),
            point(2 * SECS_PER_DAY, 10_150.0),
            point(2 * SECS_PER_DAY + 3_600, 10_200.0),
        ];
        let returns = daily_returns(&curve);
        // Day 1 close 10100 vs day 0 close 10050; day 2 close 10200 vs 10100.
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - (10_100.0 - 10_050.0) / 10_050.0).abs() < 1e-10);
        assert!((returns[1] - (10_200.0 - 10_100.0) / 10_100.0).abs() < 1e-10);
    }

    #[test]
    fn daily_returns_single_day_curve() {
        // All points within one calendar day: the final-partial-day rule
        // applies against the first point's equity.
        let curve = vec![point(100, 10_000.0), point(200, 10_100.0)];
        let returns = daily_returns(&curve);
        assert_eq!(returns.len(), 1);
        assert!((returns[0] - 0.01).abs() < 1e-10);
    }

    #[test]
    fn daily_returns_flat_final_day_is_skipped() {
        let curve = vec![
            point(0, 10_000.0),
            point(SECS_PER_DAY, 10_100.0),
            point(2 * SECS_PER_DAY, 10_100.0),
        ];
        let returns = daily_returns(&curve);
        // Day 1 return emitted at the day-2 boundary; day 2 is flat.
        assert_eq!(returns.len(), 1);
        assert!((returns[0] - 0.01).abs() < 1e-10);
    }

    #[test]
    fn daily_returns_requires_two_points() {
        assert!(daily_returns(&[]).is_empty());
        assert!(daily_returns(&[point(0, 10_000.0)]).is_empty());
    }

    // ── Rate conversion ──

    #[test]
    fn annual_to_period_roundtrips() {
        let daily = annual_to_period_rate(0.05, 365.0);
        assert!(((1.0 + daily).powf(365.0) - 1.05).abs() < 1e-10);
    }

    #[test]
    fn annual_to_period_zero_periods() {
        assert_eq!(annual_to_period_rate(0.05, 0.0), 0.0);
        assert_eq!(annual_to_period_rate(0.05, -1.0), 0.0);
    }

    // ── Sharpe ──

    #[test]
    fn sharpe_positive_for_positive_mean() {
        let curve = daily_curve(&[10_000.0, 10_100.0, 10_000.0, 10_200.0, 10_300.0]);
        let returns = daily_returns(&curve);
        let s = sharpe_ratio(&returns, DEFAULT_RISK_FREE_RATE, PERIODS_PER_YEAR);
        assert!(s > 0.0, "expected positive Sharpe, got {s}");
        assert!(s.is_finite());
    }

    #[test]
    fn sharpe_fewer_than_two_returns_is_zero() {
        assert_eq!(sharpe_ratio(&[], 0.0, 365.0), 0.0);
        assert_eq!(sharpe_ratio(&[0.01], 0.0, 365.0), 0.0);
    }

    #[test]
    fn sharpe_zero_variance_positive_mean_is_infinite() {
        let s = sharpe_ratio(&[0.01, 0.01, 0.01], 0.0, 365.0);
        assert_eq!(s, f64::INFINITY);
    }

    #[test]
    fn sharpe_zero_variance_negative_mean_is_zero() {
        assert_eq!(sharpe_ratio(&[-0.01, -0.01], 0.0, 365.0), 0.0);
        assert_eq!(sharpe_ratio(&[0.0, 0.0], 0.0, 365.0), 0.0);
    }

    #[test]
    fn sharpe_annualizes_with_sqrt_365() {
        let returns = [0.01, 0.02, 0.015, 0.005];
        let m = stats::mean(&returns);
        let sd = stats::std_dev(&returns);
        let expected = m / sd * 365.0_f64.sqrt();
        assert!((sharpe_ratio(&returns, 0.0, 365.0) - expected).abs() < 1e-10);
    }

    // ── Sortino ──

    #[test]
    fn sortino_uses_full_n_in_denominator() {
        let returns = [0.02, -0.01, 0.03, -0.02];
        // Downside deviation over all 4 returns, shortfalls only.
        let downside = ((0.01_f64.powi(2) + 0.02_f64.powi(2)) / 4.0).sqrt();
        let expected = stats::mean(&returns) / downside * 365.0_f64.sqrt();
        let s = sortino_ratio(&returns, 0.0, 0.0, 365.0);
        assert!((s - expected).abs() < 1e-10);
    }

    #[test]
    fn sortino_no_downside_positive_mean_is_infinite() {
        let s = sortino_ratio(&[0.01, 0.02, 0.03], 0.0, 0.0, 365.0);
        assert_eq!(s, f64::INFINITY);
    }

    #[test]
    fn sortino_fewer_than_two_returns_is_zero() {
        assert_eq!(sortino_ratio(&[0.01], 0.0, 0.0, 365.0), 0.0);
    }

    // ── CAGR / Calmar ──

    #[test]
    fn cagr_doubling_in_two_years() {
        let c = cagr(10_000.0, 20_000.0, 2.0);
        assert!((c - (2.0_f64.sqrt() - 1.0)).abs() < 1e-10);
    }

    #[test]
    fn cagr_degenerate_inputs_are_zero() {
        assert_eq!(cagr(10_000.0, 20_000.0, 0.0), 0.0);
        assert_eq!(cagr(0.0, 20_000.0, 1.0), 0.0);
        assert_eq!(cagr(10_000.0, -5.0, 1.0), 0.0);
    }

    #[test]
    fn calmar_no_drawdown_sentinel() {
        assert_eq!(calmar_ratio(0.25, 0.0), f64::INFINITY);
        assert_eq!(calmar_ratio(-0.1, 0.0), 0.0);
        assert_eq!(calmar_ratio(0.0, 0.0), 0.0);
    }

    #[test]
    fn calmar_uses_drawdown_magnitude() {
        assert!((calmar_ratio(0.3, 0.15) - 2.0).abs() < 1e-10);
        assert!((calmar_ratio(0.3, -0.15) - 2.0).abs() < 1e-10);
    }
}
