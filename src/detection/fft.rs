//! FFT magnitude spectra.
//!
//! Provides the one-sided DFT magnitude spectrum used by peak extraction,
//! together with the ordered edge policy (period mask, edge trim, span
//! truncation) applied before peaks are searched.

use std::f64::consts::PI;

use rustfft::{num_complex::Complex64, FftPlanner};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Result, SpectralError};
use crate::filter::hamming;

/// Taper applied to the samples before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectralWindow {
    /// Rectangular (no taper).
    #[default]
    None,
    /// Symmetric Hann window.
    Hann,
    /// Symmetric Hamming window.
    Hamming,
}

impl SpectralWindow {
    fn coefficients(&self, n: usize) -> Option<Vec<f64>> {
        match self {
            SpectralWindow::None => None,
            SpectralWindow::Hamming => Some(hamming(n)),
            SpectralWindow::Hann if n < 2 => Some(vec![1.0; n]),
            SpectralWindow::Hann => {
                let m = (n - 1) as f64;
                Some(
                    (0..n)
                        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / m).cos()))
                        .collect(),
                )
            }
        }
    }
}

/// Scaling applied to DFT magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Raw modulus `|X[k]|`.
    #[default]
    None,
    /// `|X[k]| / N`.
    Length,
}

/// How a sample array becomes a one-sided spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumConfig {
    /// Keep the Nyquist bin of even-length inputs.
    pub include_nyquist: bool,
    /// Magnitude scaling.
    pub normalization: Normalization,
    /// Taper applied before the transform.
    pub window: SpectralWindow,
    /// Drop bins whose period (in samples) exceeds this.
    pub max_period: Option<f64>,
    /// Drop the first and last bins left after the period mask.
    pub trim_edges: bool,
    /// Drop bins whose scaled period exceeds this.
    pub max_span: Option<f64>,
    /// Multiplier from sample-unit periods to presentation units.
    pub period_scale: f64,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            include_nyquist: false,
            normalization: Normalization::None,
            window: SpectralWindow::None,
            max_period: Some(3650.0),
            trim_edges: true,
            max_span: None,
            period_scale: 1.0,
        }
    }
}

impl SpectrumConfig {
    /// Plain one-sided spectrum: no masks, no trimming.
    pub fn unmasked() -> Self {
        Self {
            max_period: None,
            trim_edges: false,
            ..Self::default()
        }
    }

    /// Set the maximum period in samples.
    pub fn with_max_period(mut self, max_period: Option<f64>) -> Self {
        self.max_period = max_period;
        self
    }

    /// Set the maximum scaled period.
    pub fn with_max_span(mut self, max_span: Option<f64>) -> Self {
        self.max_span = max_span;
        self
    }

    /// Set the period scale.
    pub fn with_period_scale(mut self, scale: f64) -> Self {
        self.period_scale = scale;
        self
    }

    /// Enable or disable edge trimming.
    pub fn with_trim_edges(mut self, trim: bool) -> Self {
        self.trim_edges = trim;
        self
    }

    /// Set magnitude normalization.
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Set the analysis window.
    pub fn with_window(mut self, window: SpectralWindow) -> Self {
        self.window = window;
        self
    }

    /// Keep or drop the Nyquist bin.
    pub fn with_nyquist(mut self, include: bool) -> Self {
        self.include_nyquist = include;
        self
    }

    /// Check ranges of the numeric settings.
    pub fn validate(&self) -> Result<()> {
        if let Some(max_period) = self.max_period {
            if !(max_period > 0.0) {
                return Err(SpectralError::InvalidParameter(format!(
                    "max period must be positive, got {}",
                    max_period
                )));
            }
        }
        if let Some(max_span) = self.max_span {
            if !(max_span > 0.0) {
                return Err(SpectralError::InvalidParameter(format!(
                    "max span must be positive, got {}",
                    max_span
                )));
            }
        }
        if !self.period_scale.is_finite() || self.period_scale <= 0.0 {
            return Err(SpectralError::InvalidParameter(format!(
                "period scale must be positive, got {}",
                self.period_scale
            )));
        }
        Ok(())
    }
}

/// One-sided magnitude spectrum.
///
/// Frequencies are strictly positive and ascending, magnitudes are
/// non-negative, and `bins` holds the DFT index each entry came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    frequencies: Vec<f64>,
    magnitudes: Vec<f64>,
    bins: Vec<usize>,
    period_scale: f64,
}

impl Spectrum {
    /// Build a spectrum from parallel arrays.
    ///
    /// Frequencies must be positive and strictly ascending and magnitudes
    /// finite and non-negative. Bins are numbered from zero.
    pub fn new(frequencies: Vec<f64>, magnitudes: Vec<f64>) -> Result<Self> {
        if frequencies.len() != magnitudes.len() {
            return Err(SpectralError::DimensionMismatch {
                expected: frequencies.len(),
                got: magnitudes.len(),
            });
        }
        if frequencies.first().is_some_and(|&f| !(f > 0.0))
            || frequencies.windows(2).any(|w| !(w[1] > w[0]))
        {
            return Err(SpectralError::InvalidInput(
                "frequencies must be positive and strictly ascending".to_string(),
            ));
        }
        if let Some(index) = magnitudes.iter().position(|m| !(m.is_finite() && *m >= 0.0)) {
            return Err(SpectralError::InvalidInput(format!(
                "magnitude at index {} is negative or non-finite",
                index
            )));
        }
        let bins = (0..frequencies.len()).collect();
        Ok(Self {
            frequencies,
            magnitudes,
            bins,
            period_scale: 1.0,
        })
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// True when no bins remain.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequencies in cycles per sample.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Magnitudes.
    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    /// Source DFT bin of each entry.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// Multiplier from sample-unit periods to presentation units.
    pub fn period_scale(&self) -> f64 {
        self.period_scale
    }

    /// Replace the period scale.
    pub fn with_period_scale(mut self, scale: f64) -> Self {
        self.period_scale = scale;
        self
    }

    /// Period of bin `i` in samples.
    pub fn period(&self, i: usize) -> f64 {
        1.0 / self.frequencies[i]
    }

    /// Period of bin `i` in presentation units.
    pub fn scaled_period(&self, i: usize) -> f64 {
        self.period(i) * self.period_scale
    }

    /// Periods of all bins in samples.
    pub fn periods(&self) -> Vec<f64> {
        self.frequencies.iter().map(|f| 1.0 / f).collect()
    }

    /// Periods of all bins in presentation units.
    pub fn scaled_periods(&self) -> Vec<f64> {
        self.frequencies
            .iter()
            .map(|f| self.period_scale / f)
            .collect()
    }

    /// Multiply every frequency by `factor` (e.g. to express a minute-bar
    /// spectrum in cycles per trading day). Periods follow the new unit.
    pub fn scale_frequencies(mut self, factor: f64) -> Self {
        for f in &mut self.frequencies {
            *f *= factor;
        }
        self
    }

    /// The `k` strongest bins as `(frequency, magnitude)`, strongest first.
    pub fn top_k(&self, k: usize) -> Vec<(f64, f64)> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.magnitudes[b].total_cmp(&self.magnitudes[a]));
        order
            .into_iter()
            .take(k)
            .map(|i| (self.frequencies[i], self.magnitudes[i]))
            .collect()
    }

    /// Element-wise mean magnitude of spectra sharing one frequency axis.
    pub fn average(spectra: &[Spectrum]) -> Result<Spectrum> {
        let first = spectra.first().ok_or(SpectralError::EmptyData)?;
        let mut magnitudes = vec![0.0; first.len()];
        for s in spectra {
            if s.len() != first.len() {
                return Err(SpectralError::DimensionMismatch {
                    expected: first.len(),
                    got: s.len(),
                });
            }
            for (acc, m) in magnitudes.iter_mut().zip(&s.magnitudes) {
                *acc += m;
            }
        }
        let count = spectra.len() as f64;
        for m in &mut magnitudes {
            *m /= count;
        }
        Ok(Spectrum {
            frequencies: first.frequencies.clone(),
            magnitudes,
            bins: first.bins.clone(),
            period_scale: first.period_scale,
        })
    }

    fn retain(&mut self, keep: impl Fn(usize) -> bool) {
        let kept: Vec<usize> = (0..self.len()).filter(|&i| keep(i)).collect();
        self.frequencies = kept.iter().map(|&i| self.frequencies[i]).collect();
        self.magnitudes = kept.iter().map(|&i| self.magnitudes[i]).collect();
        self.bins = kept.iter().map(|&i| self.bins[i]).collect();
    }

    fn drop_edges(&mut self) {
        if self.len() <= 2 {
            self.frequencies.clear();
            self.magnitudes.clear();
            self.bins.clear();
            return;
        }
        let last = self.len() - 1;
        self.frequencies = self.frequencies[1..last].to_vec();
        self.magnitudes = self.magnitudes[1..last].to_vec();
        self.bins = self.bins[1..last].to_vec();
    }
}

/// Compute the full complex DFT of a real-valued signal.
pub fn fft_complex(signal: &[f64]) -> Vec<Complex64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    buffer
}

/// DFT sample frequencies for `n` samples spaced `d` apart, in the standard
/// order `[0, 1, ..., n/2 - 1, -n/2, ..., -1] / (d n)` (odd `n` runs up to
/// `(n - 1) / 2`).
pub fn fft_frequencies(n: usize, d: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let scale = 1.0 / (n as f64 * d);
    let positive_end = (n - 1) / 2 + 1;
    (0..n)
        .map(|k| {
            if k < positive_end {
                k as f64 * scale
            } else {
                (k as f64 - n as f64) * scale
            }
        })
        .collect()
}

/// One-sided spectrum of `signal` without any period or span masking.
///
/// Keeps bins `1..=(n - 1) / 2` (strictly positive frequencies), plus the
/// Nyquist bin for even `n` when requested.
pub fn one_sided_spectrum(
    signal: &[f64],
    include_nyquist: bool,
    normalization: Normalization,
    window: SpectralWindow,
) -> Result<Spectrum> {
    let n = signal.len();
    if n == 0 {
        return Err(SpectralError::EmptyData);
    }

    let tapered: Vec<f64> = match window.coefficients(n) {
        Some(w) => signal.iter().zip(w).map(|(x, w)| x * w).collect(),
        None => signal.to_vec(),
    };

    let dft = fft_complex(&tapered);
    let freqs = fft_frequencies(n, 1.0);
    let scale = match normalization {
        Normalization::None => 1.0,
        Normalization::Length => 1.0 / n as f64,
    };

    let mut bins: Vec<usize> = (1..n).filter(|&k| freqs[k] > 0.0).collect();
    if include_nyquist && n.is_multiple_of(2) {
        bins.push(n / 2);
    }

    let frequencies = bins
        .iter()
        .map(|&k| if k == n - k { 0.5 } else { freqs[k] })
        .collect();
    let magnitudes = bins.iter().map(|&k| dft[k].norm() * scale).collect();

    Ok(Spectrum {
        frequencies,
        magnitudes,
        bins,
        period_scale: 1.0,
    })
}

/// One-sided magnitude spectrum with the edge policy applied in order:
/// period mask, edge trim, span truncation.
///
/// # Example
/// ```
/// use prism_spectral::detection::{magnitude_spectrum, SpectrumConfig};
///
/// let signal: Vec<f64> = (0..128)
///     .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 16.0).sin())
///     .collect();
/// let spectrum = magnitude_spectrum(&signal, &SpectrumConfig::unmasked()).unwrap();
/// let (freq, _) = spectrum.top_k(1)[0];
/// assert!((1.0 / freq - 16.0).abs() < 1e-9);
/// ```
pub fn magnitude_spectrum(signal: &[f64], config: &SpectrumConfig) -> Result<Spectrum> {
    let mut spectrum = one_sided_spectrum(
        signal,
        config.include_nyquist,
        config.normalization,
        config.window,
    )?
    .with_period_scale(config.period_scale);
    trace!(bins = spectrum.len(), "one-sided spectrum");

    if let Some(max_period) = config.max_period {
        let periods = spectrum.periods();
        spectrum.retain(|i| periods[i] <= max_period);
        trace!(bins = spectrum.len(), max_period, "after period mask");
    }

    if config.trim_edges {
        spectrum.drop_edges();
        trace!(bins = spectrum.len(), "after edge trim");
    }

    if let Some(max_span) = config.max_span {
        let scaled = spectrum.scaled_periods();
        spectrum.retain(|i| scaled[i] <= max_span);
        trace!(bins = spectrum.len(), max_span, "after span truncation");
    }

    if spectrum.is_empty() {
        return Err(SpectralError::EmptySpectrum(format!(
            "no bins left from {} samples",
            signal.len()
        )));
    }
    Ok(spectrum)
}
