//! Equity curve downsampling — bounded storage without losing the shape.
//!
//! Two interchangeable strategies, selected by `DownsampleConfig`:
//! - LTTB (largest-triangle-three-buckets) keeps the points that carry the
//!   most visual information: local extrema and inflections.
//! - Drawdown peaks keeps every local maximum of the drawdown fraction and
//!   fills the remaining quota with evenly spaced samples.
//!
//! Both always retain the first and last input points, preserve input
//! order, and pass the input through untouched when the target is not
//! smaller than the curve.

use serde::{Deserialize, Serialize};
use tunelab_core::EquityPoint;

/// Downsampling strategy selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DownsampleStrategy {
    /// Largest-triangle-three-buckets selection.
    Lttb,
    /// Keep drawdown peaks, fill the rest evenly.
    DrawdownPeaks,
}

/// Downsampler configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DownsampleConfig {
    pub strategy: DownsampleStrategy,
    pub target_points: usize,
}

impl Default for DownsampleConfig {
    fn default() -> Self {
        Self {
            strategy: DownsampleStrategy::Lttb,
            target_points: 500,
        }
    }
}

/// Reduce `points` to approximately `config.target_points` samples.
pub fn downsample(points: &[EquityPoint], config: &DownsampleConfig) -> Vec<EquityPoint> {
    match config.strategy {
        DownsampleStrategy::Lttb => lttb(points, config.target_points),
        DownsampleStrategy::DrawdownPeaks => drawdown_peaks(points, config.target_points),
    }
}

/// Largest-triangle-three-buckets selection.
///
/// Keeps the first and last points; partitions the interior into
/// `target − 2` buckets of floor-computed (generally non-integer) size and
/// keeps, per bucket, the point maximizing the triangle area formed with
/// the previously selected point and the next bucket's centroid. Output
/// length never exceeds `target`.
pub fn lttb(points: &[EquityPoint], target: usize) -> Vec<EquityPoint> {
    let n = points.len();
    if target >= n || n <= 2 {
        return points.to_vec();
    }
    if target <= 2 {
        return vec![points[0], points[n - 1]];
    }

    let bucket_size = (n - 2) as f64 / (target - 2) as f64;
    let mut sampled = Vec::with_capacity(target);
    sampled.push(points[0]);
    let mut selected = 0usize;

    for bucket in 0..target - 2 {
        // Current bucket: candidates for selection.
        let start = (bucket as f64 * bucket_size).floor() as usize + 1;
        let end = (((bucket + 1) as f64) * bucket_size).floor() as usize + 1;
        let end = end.min(n - 1);

        // Next bucket: centroid used as the triangle's third vertex. The
        // final bucket's "next" is the last point itself.
        let next_start = end;
        let next_end = ((((bucket + 2) as f64) * bucket_size).floor() as usize + 1).min(n);
        let (centroid_t, centroid_eq) = if next_start < next_end {
            let count = (next_end - next_start) as f64;
            let sum_t: f64 = points[next_start..next_end]
                .iter()
                .map(|p| p.timestamp as f64)
                .sum();
            let sum_eq: f64 = points[next_start..next_end].iter().map(|p| p.equity).sum();
            (sum_t / count, sum_eq / count)
        } else {
            (points[n - 1].timestamp as f64, points[n - 1].equity)
        };

        let anchor_t = points[selected].timestamp as f64;
        let anchor_eq = points[selected].equity;

        let mut best_area = -1.0;
        let mut best_index = start;
        for (index, point) in points.iter().enumerate().take(end).skip(start) {
            let area = ((anchor_t - centroid_t) * (point.equity - anchor_eq)
                - (anchor_t - point.timestamp as f64) * (centroid_eq - anchor_eq))
                .abs()
                * 0.5;
            if area > best_area {
                best_area = area;
                best_index = index;
            }
        }

        sampled.push(points[best_index]);
        selected = best_index;
    }

    sampled.push(points[n - 1]);
    sampled
}

/// Drawdown-peak-preserving selection.
///
/// Keeps the first and last points plus every interior index whose
/// drawdown fraction is positive and at least its neighbors'. If those
/// alone meet the target the sorted set is returned as-is (and may exceed
/// the target); otherwise the remaining quota is filled with rounded,
/// evenly spaced indices deduplicated against the chosen set.
pub fn drawdown_peaks(points: &[EquityPoint], target: usize) -> Vec<EquityPoint> {
    let n = points.len();
    if target >= n || n <= 2 {
        return points.to_vec();
    }

    let mut chosen = std::collections::BTreeSet::new();
    chosen.insert(0);
    chosen.insert(n - 1);

    for i in 1..n - 1 {
        let dd = points[i].drawdown_pct;
        if dd > 0.0 && dd >= points[i - 1].drawdown_pct && dd >= points[i + 1].drawdown_pct {
            chosen.insert(i);
        }
    }

    if chosen.len() < target {
        let quota = target - chosen.len();
        for k in 1..=quota {
            let index = (k as f64 * (n - 1) as f64 / (quota + 1) as f64).round() as usize;
            chosen.insert(index);
        }
    }

    chosen.into_iter().map(|i| points[i]).collect()
}
