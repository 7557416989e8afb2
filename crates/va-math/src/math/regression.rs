//! Closed-form least squares over short, ordinally indexed series.
//!
//! The velocity engine fits a line through at most a handful of samples,
//! so the fit is computed directly from centred sums rather than through
//! a general numerics library.

use serde::{Deserialize, Serialize};

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Number of points the fit was computed over.
    pub n: usize,
}

impl LinearFit {
    /// Predicted value at `x`.
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Arithmetic mean. Returns None for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Ordinary least squares fit of `ys` against their positions `0, 1, ..., n-1`.
///
/// Returns None when fewer than two points are given, when the index set
/// has zero variance, or when any value is non-finite.
pub fn fit_index_series(ys: &[f64]) -> Option<LinearFit> {
    let n = ys.len();
    if n < 2 || ys.iter().any(|y| !y.is_finite()) {
        return None;
    }

    let x_mean = (n as f64 - 1.0) / 2.0;
    let y_mean = mean(ys)?;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxx += dx * dx;
        sxy += dx * (y - y_mean);
    }

    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
        n,
    })
}

/// Slope of the least squares line through `ys` by ordinal position.
///
/// Degenerate inputs (fewer than two points, non-finite values) yield 0.0.
pub fn index_slope(ys: &[f64]) -> f64 {
    fit_index_series(ys).map(|fit| fit.slope).unwrap_or(0.0)
}
