//! Windowed-sinc low-pass design with length-adaptive tap count.

use std::f64::consts::PI;

use rustfft::num_complex::Complex64;
use tracing::debug;

use crate::error::{Result, SpectralError};

/// Smallest odd tap count that still forms a symmetric low-pass kernel.
pub const MIN_TAPS: usize = 3;

/// Shortest series the adaptive filter accepts.
pub const MIN_FILTER_LEN: usize = 4;

/// Edge padding is this many times the tap count.
pub const PAD_FACTOR: usize = 3;

/// The requested cutoff is shrunk by this factor to stay inside (0, 1).
pub const CUTOFF_SHRINK: f64 = 0.99;

/// Upper bound on the Nyquist-normalized cutoff.
pub const MAX_NORMALIZED_CUTOFF: f64 = 0.99;

/// Symmetric Hamming window of length `n`.
pub fn hamming(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let m = (n - 1) as f64;
            (0..n)
                .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / m).cos())
                .collect()
        }
    }
}

/// Normalized sinc, `sin(pi x) / (pi x)`.
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Hamming-windowed sinc low-pass taps, scaled to unit DC gain.
///
/// `cutoff` is relative to the Nyquist frequency and must lie in (0, 1).
///
/// # Example
/// ```
/// use prism_spectral::filter::firwin_lowpass;
///
/// let taps = firwin_lowpass(3, 0.5).unwrap();
/// assert!((taps.iter().sum::<f64>() - 1.0).abs() < 1e-12);
/// assert!((taps[1] - 0.907557).abs() < 1e-6);
/// ```
pub fn firwin_lowpass(num_taps: usize, cutoff: f64) -> Result<Vec<f64>> {
    if num_taps < MIN_TAPS || num_taps.is_multiple_of(2) {
        return Err(SpectralError::FilterDesign(format!(
            "tap count must be odd and at least {}, got {}",
            MIN_TAPS, num_taps
        )));
    }
    if !(cutoff > 0.0 && cutoff < 1.0) {
        return Err(SpectralError::FilterDesign(format!(
            "normalized cutoff must lie in (0, 1), got {}",
            cutoff
        )));
    }

    let alpha = (num_taps - 1) as f64 / 2.0;
    let mut taps: Vec<f64> = hamming(num_taps)
        .into_iter()
        .enumerate()
        .map(|(i, w)| cutoff * sinc(cutoff * (i as f64 - alpha)) * w)
        .collect();

    let gain: f64 = taps.iter().sum();
    for t in &mut taps {
        *t /= gain;
    }
    Ok(taps)
}

/// Map a cutoff in cycles per unit time to the Nyquist-normalized value used
/// for the design: `min(cutoff / nyquist * 0.99, 0.99)`.
pub fn normalized_cutoff(cutoff: f64, sample_rate: f64) -> Result<f64> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(SpectralError::FilterDesign(format!(
            "sample rate must be positive, got {}",
            sample_rate
        )));
    }
    if !cutoff.is_finite() || cutoff <= 0.0 {
        return Err(SpectralError::FilterDesign(format!(
            "cutoff must be positive, got {}",
            cutoff
        )));
    }
    let nyquist = sample_rate / 2.0;
    Ok((cutoff / nyquist * CUTOFF_SHRINK).min(MAX_NORMALIZED_CUTOFF))
}

/// A concrete FIR design for one series length.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDesign {
    taps: Vec<f64>,
    pad_len: usize,
    cutoff: f64,
}

impl FilterDesign {
    /// Design a low-pass filter for a series of length `n`.
    ///
    /// Starts from `min(requested_taps, n - 1)` (made odd) and sheds two taps
    /// at a time until the `3 * taps` edge padding fits inside the series, or
    /// the minimum of three taps is reached.
    pub fn adaptive(requested_taps: usize, n: usize, cutoff: f64, sample_rate: f64) -> Result<Self> {
        if n < MIN_FILTER_LEN {
            return Err(SpectralError::InsufficientData {
                needed: MIN_FILTER_LEN,
                got: n,
            });
        }

        let mut num_taps = requested_taps.min(n - 1);
        if num_taps.is_multiple_of(2) {
            num_taps = num_taps.saturating_sub(1);
        }
        if num_taps < MIN_TAPS {
            return Err(SpectralError::FilterDesign(format!(
                "no odd tap count >= {} available from {} requested taps",
                MIN_TAPS, requested_taps
            )));
        }

        let cutoff = normalized_cutoff(cutoff, sample_rate)?;
        let mut taps = firwin_lowpass(num_taps, cutoff)?;
        let mut pad_len = PAD_FACTOR * taps.len();

        while num_taps > MIN_TAPS && pad_len >= n {
            num_taps -= 2;
            taps = firwin_lowpass(num_taps, cutoff)?;
            pad_len = PAD_FACTOR * taps.len();
            debug!(num_taps, pad_len, n, "reduced FIR tap count to fit series");
        }

        Ok(Self {
            taps,
            pad_len,
            cutoff,
        })
    }

    /// Filter coefficients.
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Number of taps (always odd).
    pub fn num_taps(&self) -> usize {
        self.taps.len()
    }

    /// Reflection padding applied to each end of the series.
    pub fn pad_len(&self) -> usize {
        self.pad_len
    }

    /// Nyquist-normalized cutoff actually used.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Magnitude response at `points` evenly spaced frequencies from DC to
    /// Nyquist, as `(normalized_frequency, gain)` pairs.
    pub fn frequency_response(&self, points: usize) -> Vec<(f64, f64)> {
        if points < 2 {
            return Vec::new();
        }
        (0..points)
            .map(|k| {
                let f = k as f64 / (points - 1) as f64;
                let omega = PI * f;
                let response: Complex64 = self
                    .taps
                    .iter()
                    .enumerate()
                    .map(|(n, &h)| Complex64::from_polar(h, -omega * n as f64))
                    .sum();
                (f, response.norm())
            })
            .collect()
    }
}
