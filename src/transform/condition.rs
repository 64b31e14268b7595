//! Signal conditioning ahead of the spectral transform.
//!
//! Removes the mean (and optionally a log-scale linear trend) so that the
//! DC bin does not dominate the spectrum and long-horizon growth does not
//! leak into the low-frequency bins.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpectralError};
use crate::utils::{is_constant, linear_fit, mean};

/// Conditioning applied to raw samples before filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conditioning {
    /// Subtract the arithmetic mean.
    #[default]
    Center,
    /// Subtract the least-squares line over the sample index.
    Detrend,
    /// `ln(1 + x)` followed by [`Conditioning::Detrend`]. Inputs must be `>= 0`.
    LogDetrend,
}

/// Check that a raw sample array is usable: at least two finite values.
pub fn validate_samples(series: &[f64]) -> Result<()> {
    if series.is_empty() {
        return Err(SpectralError::EmptyData);
    }
    if series.len() < 2 {
        return Err(SpectralError::InsufficientData {
            needed: 2,
            got: series.len(),
        });
    }
    if let Some(index) = series.iter().position(|x| !x.is_finite()) {
        return Err(SpectralError::NonFinite { index });
    }
    Ok(())
}

/// Subtract the mean from every sample.
///
/// # Example
/// ```
/// use prism_spectral::transform::center;
///
/// let centered = center(&[1.0, 2.0, 3.0]).unwrap();
/// assert_eq!(centered, vec![-1.0, 0.0, 1.0]);
/// ```
pub fn center(series: &[f64]) -> Result<Vec<f64>> {
    validate_samples(series)?;
    if is_constant(series) {
        return Ok(vec![0.0; series.len()]);
    }
    let m = mean(series);
    Ok(series.iter().map(|&x| x - m).collect())
}

/// Remove the ordinary-least-squares linear trend.
///
/// The residual has zero mean and zero slope over the sample index.
pub fn detrend(series: &[f64]) -> Result<Vec<f64>> {
    validate_samples(series)?;
    if is_constant(series) {
        return Ok(vec![0.0; series.len()]);
    }
    let fit = linear_fit(series).ok_or(SpectralError::InsufficientData {
        needed: 2,
        got: series.len(),
    })?;
    Ok(series
        .iter()
        .enumerate()
        .map(|(i, &y)| y - fit.at(i))
        .collect())
}

/// `ln(1 + x)` followed by linear detrending.
///
/// Stabilises the variance of volume counts whose level grows over the
/// analysed horizon.
pub fn log_detrend(series: &[f64]) -> Result<Vec<f64>> {
    validate_samples(series)?;
    if let Some(index) = series.iter().position(|&x| x < 0.0) {
        return Err(SpectralError::InvalidInput(format!(
            "log conditioning requires non-negative samples, found {} at index {}",
            series[index], index
        )));
    }
    let logged: Vec<f64> = series.iter().map(|x| x.ln_1p()).collect();
    detrend(&logged)
}

/// Apply the requested conditioning.
pub fn condition(series: &[f64], conditioning: Conditioning) -> Result<Vec<f64>> {
    match conditioning {
        Conditioning::Center => center(series),
        Conditioning::Detrend => detrend(series),
        Conditioning::LogDetrend => log_detrend(series),
    }
}

/// Flatten a single-row or single-column matrix into a 1-D array.
///
/// Anything with more than one row *and* more than one column is rejected.
pub fn squeeze(rows: &[Vec<f64>]) -> Result<Vec<f64>> {
    match rows {
        [] => Err(SpectralError::EmptyData),
        [row] => Ok(row.clone()),
        _ if rows.iter().all(|r| r.len() == 1) => Ok(rows.iter().map(|r| r[0]).collect()),
        _ => Err(SpectralError::InvalidInput(format!(
            "expected 1-D input, got {} rows of lengths {:?}",
            rows.len(),
            rows.iter().map(Vec::len).collect::<Vec<_>>()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::utils::linear_fit;
    use approx::assert_relative_eq;

    #[test]
    fn center_removes_mean() {
        let centered = center(&[2.0, 4.0, 6.0, 8.0]).unwrap();
        assert_eq!(centered, vec![-3.0, -1.0, 1.0, 3.0]);
        assert_relative_eq!(centered.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn center_constant_is_exact_zero() {
        let centered = center(&[0.1; 1000]).unwrap();
        assert!(centered.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn rejects_short_and_empty() {
        assert_eq!(center(&[]), Err(SpectralError::EmptyData));
        assert_eq!(
            center(&[1.0]),
            Err(SpectralError::InsufficientData { needed: 2, got: 1 })
        );
    }

    #[test]
    fn rejects_non_finite() {
        let err = detrend(&[1.0, f64::NAN, 3.0]).unwrap_err();
        assert_eq!(err, SpectralError::NonFinite { index: 1 });
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = center(&[1.0, 2.0, f64::INFINITY]).unwrap_err();
        assert_eq!(err, SpectralError::NonFinite { index: 2 });
    }

    #[test]
    fn detrend_flattens_ramp() {
        let ramp: Vec<f64> = (0..100).map(|i| 10.0 + 0.5 * i as f64).collect();
        let residual = detrend(&ramp).unwrap();
        for r in &residual {
            assert_relative_eq!(*r, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn detrend_residual_has_zero_slope_and_mean() {
        let series: Vec<f64> = (0..200)
            .map(|i| 3.0 * i as f64 + ((i * 37 + 11) % 17) as f64)
            .collect();
        let residual = detrend(&series).unwrap();
        let fit = linear_fit(&residual).unwrap();
        assert_relative_eq!(fit.slope, 0.0, epsilon = 1e-9);
        assert_relative_eq!(mean(&residual), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn log_detrend_rejects_negative() {
        let err = log_detrend(&[1.0, -2.0, 3.0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn log_detrend_removes_exponential_growth() {
        // ln(1 + x) of e^(0.01 i) - 1 is exactly linear
        let series: Vec<f64> = (0..300).map(|i| (0.01 * i as f64).exp() - 1.0).collect();
        let residual = log_detrend(&series).unwrap();
        for r in &residual {
            assert!(r.abs() < 1e-9);
        }
    }

    #[test]
    fn condition_dispatches() {
        let series = [1.0, 2.0, 4.0, 8.0];
        assert_eq!(
            condition(&series, Conditioning::Center).unwrap(),
            center(&series).unwrap()
        );
        assert_eq!(
            condition(&series, Conditioning::Detrend).unwrap(),
            detrend(&series).unwrap()
        );
        assert_eq!(
            condition(&series, Conditioning::LogDetrend).unwrap(),
            log_detrend(&series).unwrap()
        );
    }

    #[test]
    fn squeeze_accepts_row_or_column() {
        assert_eq!(squeeze(&[vec![1.0, 2.0]]).unwrap(), vec![1.0, 2.0]);
        assert_eq!(
            squeeze(&[vec![1.0], vec![2.0], vec![3.0]]).unwrap(),
            vec![1.0, 2.0, 3.0]
        );
    }

    #[test]
    fn squeeze_rejects_matrix() {
        let err = squeeze(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(squeeze(&[]), Err(SpectralError::EmptyData));
    }
}
