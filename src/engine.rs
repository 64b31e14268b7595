//! Single-series and multi-tier analysis driver.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SpectralConfig;
use crate::core::SampleSeries;
use crate::detection::{fuse, magnitude_spectrum, FusionResult, Peak, Spectrum, Tier};
use crate::error::Result;
use crate::labels::PeriodLabel;
use crate::transform::condition;

/// Spectrum of one series and the peaks selected from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralAnalysis {
    /// Magnitude spectrum after conditioning and filtering.
    pub spectrum: Spectrum,
    /// Selected peaks, grouped by band in layout order.
    pub peaks: Vec<Peak>,
}

/// Runs the conditioning, filtering, transform and selection chain with a
/// validated [`SpectralConfig`].
///
/// # Example
///
/// ```
/// use prism_spectral::{SpectralConfig, SpectralEngine};
///
/// let series: Vec<f64> = (0..500)
///     .map(|t| (2.0 * std::f64::consts::PI * t as f64 / 10.0).sin())
///     .collect();
/// let engine = SpectralEngine::new(SpectralConfig::default()).unwrap();
/// let analysis = engine.analyze(&series).unwrap();
/// assert!(analysis.peaks.iter().any(|p| (p.period - 10.0).abs() < 0.5));
/// ```
#[derive(Debug, Clone)]
pub struct SpectralEngine {
    config: SpectralConfig,
}

impl SpectralEngine {
    /// Validate `config` and build an engine around it.
    pub fn new(config: SpectralConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The validated configuration.
    pub fn config(&self) -> &SpectralConfig {
        &self.config
    }

    /// Conditioned, optionally filtered magnitude spectrum of `series`.
    pub fn spectrum(&self, series: &[f64]) -> Result<Spectrum> {
        let conditioned = condition(series, self.config.conditioning)?;
        let prepared = match &self.config.filter {
            Some(filter) => filter.apply(&conditioned)?,
            None => conditioned,
        };
        magnitude_spectrum(&prepared, &self.config.spectrum)
    }

    /// Spectrum plus banded peak selection.
    pub fn analyze(&self, series: &[f64]) -> Result<SpectralAnalysis> {
        let spectrum = self.spectrum(series)?;
        let peaks = self.config.selection.extract(&spectrum);
        debug!(
            samples = series.len(),
            bins = spectrum.len(),
            peaks = peaks.len(),
            "analysis complete"
        );
        Ok(SpectralAnalysis { spectrum, peaks })
    }

    /// [`SpectralEngine::analyze`] over the values of a timestamped series.
    pub fn analyze_series(&self, series: &SampleSeries) -> Result<SpectralAnalysis> {
        self.analyze(series.values())
    }

    /// Per-tier spectra fused with the configured fusion settings.
    pub fn fuse(&self, tiers: &[Tier]) -> Result<FusionResult> {
        fuse(tiers, &self.config.fusion)
    }

    /// Label a peak's scaled period with the configured thresholds.
    pub fn label(&self, peak: &Peak) -> PeriodLabel {
        self.config.labels.label(peak.scaled_period)
    }
}
