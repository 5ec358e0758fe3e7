use serde::{Deserialize, Serialize};

use super::{mean, median, percentile_of_sorted};

pub const DEFAULT_IQR_FACTOR: f64 = 1.5;
pub const DEFAULT_MIN_SAMPLES: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CentralTendency {
    Mean,
    Median,
}

/// Tukey fence filter: keeps values within `factor * IQR` of the quartiles.
///
/// Samples shorter than `min_samples` are returned untouched, there are too
/// few points for the quartiles to say anything useful.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierFilter {
    pub factor: f64,
    pub min_samples: usize,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self {
            factor: DEFAULT_IQR_FACTOR,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

impl OutlierFilter {
    pub fn with_min_samples(min_samples: usize) -> Self {
        Self {
            min_samples,
            ..Default::default()
        }
    }

    /// Lower and upper fence, `None` if filtering does not apply to this sample.
    pub fn bounds(&self, values: &[f64]) -> Option<(f64, f64)> {
        if values.len() < self.min_samples || values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let q1 = percentile_of_sorted(&sorted, 25.);
        let q3 = percentile_of_sorted(&sorted, 75.);
        let iqr = q3 - q1;
        Some((q1 - self.factor * iqr, q3 + self.factor * iqr))
    }

    /// Mask of retained positions, same length as `values`.
    pub fn mask(&self, values: &[f64]) -> Vec<bool> {
        match self.bounds(values) {
            Some((low, high)) => values.iter().map(|v| *v >= low && *v <= high).collect(),
            None => vec![true; values.len()],
        }
    }

    pub fn filter(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(self.mask(values))
            .filter_map(|(v, keep)| keep.then_some(*v))
            .collect()
    }

    /// Filters `(x, y)` pairs on their `y` value, keeping pairs aligned.
    pub fn filter_pairs<T: Copy>(&self, pairs: &[(T, f64)]) -> Vec<(T, f64)> {
        let ys = pairs.iter().map(|(_, y)| *y).collect::<Vec<_>>();
        pairs
            .iter()
            .zip(self.mask(&ys))
            .filter_map(|(pair, keep)| keep.then_some(*pair))
            .collect()
    }

    /// Mean or median of the retained values.
    ///
    /// Falls back to the unfiltered sample when nothing survives the fences, and
    /// returns `None` for an empty sample.
    pub fn central_value(&self, values: &[f64], tendency: CentralTendency) -> Option<f64> {
        let retained = self.filter(values);
        let sample: &[f64] = if retained.is_empty() {
            values
        } else {
            &retained
        };
        match tendency {
            CentralTendency::Mean => mean(sample),
            CentralTendency::Median => median(sample),
        }
    }

    pub fn filtered_mean(&self, values: &[f64]) -> Option<f64> {
        self.central_value(values, CentralTendency::Mean)
    }

    pub fn filtered_median(&self, values: &[f64]) -> Option<f64> {
        self.central_value(values, CentralTendency::Median)
    }
}
