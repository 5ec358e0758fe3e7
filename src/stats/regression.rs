use serde::Serialize;

use crate::PitwallError;

pub const MIN_FIT_POINTS: usize = 3;

/// Ordinary least squares line `y = intercept + slope * x`.
///
/// Unweighted, so a single slow lap can tilt the slope noticeably.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LinearFit {
    /// Seconds per lap of tyre age when fitted on a stint.
    pub slope: f64,
    pub intercept: f64,
    /// Fitted line at the smallest and largest x, for overlays.
    pub line: [(f64, f64); 2],
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fits lap time against tyre age.
pub fn fit_degradation(points: &[(f64, f64)]) -> Result<LinearFit, PitwallError> {
    if points.len() < MIN_FIT_POINTS {
        return Err(PitwallError::InsufficientData {
            needed: MIN_FIT_POINTS,
            found: points.len(),
        });
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (sxy, sxx) = points.iter().fold((0., 0.), |(sxy, sxx), (x, y)| {
        (
            sxy + (x - mean_x) * (y - mean_y),
            sxx + (x - mean_x).powi(2),
        )
    });
    if sxx == 0. {
        return Err(PitwallError::DegenerateFit);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let min_x = points.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
    let max_x = points
        .iter()
        .map(|(x, _)| *x)
        .fold(f64::NEG_INFINITY, f64::max);

    Ok(LinearFit {
        slope,
        intercept,
        line: [
            (min_x, intercept + slope * min_x),
            (max_x, intercept + slope * max_x),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_line() {
        let fit = fit_degradation(&[(1., 90.1), (2., 90.2), (3., 90.3), (4., 90.4)]).unwrap();
        assert!((fit.slope - 0.1).abs() < 1e-9);
        assert!((fit.intercept - 90.).abs() < 1e-9);
        assert!((fit.line[0].0 - 1.).abs() < 1e-12);
        assert!((fit.line[1].1 - 90.4).abs() < 1e-9);
        assert!((fit.predict(10.) - 91.).abs() < 1e-9);
    }

    #[test]
    fn test_noisy_stint() {
        let fit = fit_degradation(&[(1., 90.15), (2., 90.0), (3., 90.25), (4., 90.1)]).unwrap();
        assert!((fit.slope - 0.01).abs() < 1e-9);
        assert!((fit.intercept - 90.1).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_points() {
        let result = fit_degradation(&[(1., 90.), (2., 91.)]);
        match result {
            Err(PitwallError::InsufficientData { needed: 3, found: 2 }) => {}
            _ => panic!("Expected InsufficientData error"),
        }
    }

    #[test]
    fn test_same_tyre_age_is_degenerate() {
        let result = fit_degradation(&[(5., 90.), (5., 91.), (5., 92.)]);
        assert!(matches!(result, Err(PitwallError::DegenerateFit)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_recovers_linear_degradation(
            base in 70.0f64..110.0f64,
            slope in -0.2f64..0.5f64,
            laps in 3usize..40,
        ) {
            let points = (1..=laps).map(|x| (x as f64, base + slope * x as f64)).collect::<Vec<_>>();
            let fit = fit_degradation(&points).unwrap();
            prop_assert!((fit.slope - slope).abs() < 1e-6);
            prop_assert!((fit.intercept - base).abs() < 1e-6);
        }
    }
}
