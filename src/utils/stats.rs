//! Statistical utility functions.

use statrs::statistics::Statistics;

/// Ordinary least-squares line fitted over the sample index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// Slope per sample.
    pub slope: f64,
    /// Value of the line at index 0.
    pub intercept: f64,
}

impl LinearFit {
    /// Value of the fitted line at sample `index`.
    pub fn at(&self, index: usize) -> f64 {
        self.intercept + self.slope * index as f64
    }
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().mean()
}

/// Fit `y = intercept + slope * i` by ordinary least squares.
///
/// Returns `None` for fewer than two samples.
///
/// # Example
/// ```
/// use prism_spectral::utils::linear_fit;
///
/// let fit = linear_fit(&[1.0, 3.0, 5.0, 7.0]).unwrap();
/// assert!((fit.slope - 2.0).abs() < 1e-12);
/// assert!((fit.intercept - 1.0).abs() < 1e-12);
/// ```
pub fn linear_fit(values: &[f64]) -> Option<LinearFit> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = mean(values);

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    for (i, &y) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        ss_xx += dx * dx;
        ss_xy += dx * (y - mean_y);
    }

    let slope = ss_xy / ss_xx;
    Some(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// True when every element equals the first one.
pub fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(&first) => values.iter().all(|&v| v == first),
        None => true,
    }
}
