use ndarray::{Array1, ArrayView1};

/// Percentile `q` in [0, 100] of already-sorted data, interpolating linearly
/// between closest ranks (the `(n − 1)·q` convention).
fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    let rank = (sorted.len() - 1) as f64 * q / 100.0;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Population standard deviation (denominator n).
fn std_dev(values: ArrayView1<f64>) -> f64 {
    let n = values.len() as f64;
    let mean = values.sum() / n;
    (values.fold(0.0, |acc, &v| acc + (v - mean) * (v - mean)) / n).sqrt()
}

/// Centre and spread used by [`robust_z`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RobustScale {
    pub median: f64,
    pub spread: f64,
}

impl RobustScale {
    /// Median and spread of `values`. The spread is the interquartile range,
    /// falling back to the standard deviation when the IQR is zero, then to 1.0.
    /// Returns `None` for empty input.
    pub fn fit(values: ArrayView1<f64>) -> Option<Self> {
        if values.is_empty() { return None }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let median = percentile_sorted(&sorted, 50.0);
        let iqr = percentile_sorted(&sorted, 75.0) - percentile_sorted(&sorted, 25.0);
        let spread = if iqr > 0.0 { iqr } else {
            let sd = std_dev(values);
            if sd > 0.0 { sd } else { 1.0 }
        };
        Some(Self { median, spread })
    }

    #[inline]
    pub fn transform(&self, values: ArrayView1<f64>) -> Array1<f64> {
        values.mapv(|v| (v - self.median) / self.spread)
    }
}

/// Robust z-score: `(x − median) / spread`, never dividing by zero.
pub fn robust_z(values: ArrayView1<f64>) -> Array1<f64> {
    match RobustScale::fit(values) {
        Some(scale) => scale.transform(values),
        None => Array1::zeros(0),
    }
}
