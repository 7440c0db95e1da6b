//! Numeric kernel — sum, mean, and population standard deviation.
//!
//! Contract: `mean([]) == 0`, `std_dev([]) == 0`, and the deviation divisor
//! is N (population, not N-1). NaN and infinity propagate per IEEE
//! semantics; nothing is filtered.

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) / values.len() as f64
}

/// Population standard deviation (divisor N).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_yield_zero() {
        assert_eq!(sum(&[]), 0.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn mean_known_values() {
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn std_dev_is_population() {
        // Variance of [2, 4, 4, 4, 5, 5, 7, 9] with divisor N is exactly 4.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&values) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn std_dev_single_value_is_zero() {
        assert_eq!(std_dev(&[3.14]), 0.0);
    }

    #[test]
    fn nan_propagates() {
        assert!(mean(&[1.0, f64::NAN]).is_nan());
        assert!(std_dev(&[1.0, f64::NAN]).is_nan());
    }
}
