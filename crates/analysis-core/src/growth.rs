//! Growth helpers for statement histories.
//!
//! Provider tables are ordered most-recent-first. Changes are taken in table
//! order, each period against the one listed before it, and averaged into a
//! growth ratio (`1.0` means flat).

/// Compute the mean of a data slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Fractional change between adjacent entries, in table order.
///
/// Each change is `next / prev - 1`. A zero `prev` yields an infinite change
/// (or NaN for `0 / 0`); NaN changes are dropped from the result.
pub fn period_changes(history: &[f64]) -> Vec<f64> {
    history
        .windows(2)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .filter(|change| !change.is_nan())
        .collect()
}

/// Mean period-over-period growth ratio: the mean change plus one.
///
/// `None` when fewer than two periods exist or no change is defined.
pub fn mean_growth_ratio(history: &[f64]) -> Option<f64> {
    let changes = period_changes(history);
    if changes.is_empty() {
        return None;
    }
    let ratio = mean(&changes) + 1.0;
    (!ratio.is_nan()).then_some(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_changes_follow_table_order() {
        // reported most recent first: 121, 110, 100
        let changes = period_changes(&[121.0, 110.0, 100.0]);
        assert_eq!(changes.len(), 2);
        assert!((changes[0] - (110.0 / 121.0 - 1.0)).abs() < 1e-12);
        assert!((changes[1] - (100.0 / 110.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_flat_history_has_unit_ratio() {
        assert_eq!(mean_growth_ratio(&[100.0, 100.0, 100.0]), Some(1.0));
    }

    #[test]
    fn test_zero_base_gives_infinite_change() {
        let changes = period_changes(&[0.0, 100.0]);
        assert_eq!(changes, vec![f64::INFINITY]);
        assert_eq!(mean_growth_ratio(&[0.0, 100.0]), Some(f64::INFINITY));
    }

    #[test]
    fn test_undefined_changes_are_skipped() {
        assert!(period_changes(&[0.0, 0.0]).is_empty());
        assert_eq!(mean_growth_ratio(&[0.0, 0.0]), None);
        // 0/0 is dropped; 100/0 is infinite and dominates the mean
        let ratio = mean_growth_ratio(&[0.0, 0.0, 100.0, 50.0]).unwrap();
        assert!(ratio.is_infinite());
    }

    #[test]
    fn test_ratio_requires_two_periods() {
        assert_eq!(mean_growth_ratio(&[100.0]), None);
        assert_eq!(mean_growth_ratio(&[]), None);
        let g = mean_growth_ratio(&[200.0, 100.0]).unwrap();
        assert!((g - 0.5).abs() < 1e-12);
    }
}
