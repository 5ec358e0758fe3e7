pub mod delta;
pub mod outliers;
pub mod regression;

pub use delta::{CumulativeDelta, cumulative_delta, repair_interior_laps};
pub use outliers::{CentralTendency, OutlierFilter};
pub use regression::{LinearFit, fit_degradation};

/// Arithmetic mean. `None` is the "no data" sentinel for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of the values, `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.)
}

/// Population standard deviation (divides by N).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Percentile with linear interpolation between the two closest ranks, `pct` in 0..=100.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(percentile_of_sorted(&sorted, pct))
}

pub(crate) fn percentile_of_sorted(sorted: &[f64], pct: f64) -> f64 {
    let rank = (pct.clamp(0., 100.) / 100.) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
}

/// Keeps only finite, strictly positive durations.
pub fn valid_durations<I>(values: I) -> Vec<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite() && *v > 0.)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_median() {
        assert_eq!(mean(&[1., 2., 3., 6.]), Some(3.));
        assert_eq!(median(&[1., 2., 3., 6.]), Some(2.5));
        assert_eq!(median(&[5., 1., 3.]), Some(3.));
    }

    #[test]
    fn test_empty_input_returns_sentinel() {
        assert_eq!(mean(&[]), None);
        assert_eq!(median(&[]), None);
        assert_eq!(std_dev(&[]), None);
        assert_eq!(percentile(&[], 25.), None);
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        // matches numpy.percentile default method
        let values = [90., 91., 92., 93., 120.];
        assert_eq!(percentile(&values, 25.), Some(91.));
        assert_eq!(percentile(&values, 75.), Some(93.));
        let values = [1., 2., 3., 4.];
        assert_eq!(percentile(&values, 25.), Some(1.75));
        assert_eq!(percentile(&values, 75.), Some(3.25));
    }

    #[test]
    fn test_population_std_dev() {
        let sd = std_dev(&[2., 4., 4., 4., 5., 5., 7., 9.]).unwrap();
        assert!((sd - 2.).abs() < 1e-12);
        assert_eq!(std_dev(&[2.5]), Some(0.));
    }

    #[test]
    fn test_valid_durations_drops_missing_and_non_positive() {
        let values = vec![Some(90.), None, Some(-1.), Some(0.), Some(f64::NAN), Some(91.)];
        assert_eq!(valid_durations(values), vec![90., 91.]);
    }
}
