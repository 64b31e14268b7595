//! Analysis configuration.

use serde::{Deserialize, Serialize};

use crate::detection::{BandLayout, FusionConfig, PeakSelector, SpectrumConfig};
use crate::error::Result;
use crate::filter::LowPassFilter;
use crate::labels::LabelThresholds;
use crate::transform::Conditioning;

/// Every tunable of a spectral analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralConfig {
    /// Conditioning applied before filtering.
    pub conditioning: Conditioning,
    /// Low-pass filter; `None` skips filtering.
    pub filter: Option<LowPassFilter>,
    /// Transform and edge policy.
    pub spectrum: SpectrumConfig,
    /// Peak partition and thinning.
    pub selection: PeakSelector,
    /// Multi-tier settings.
    pub fusion: FusionConfig,
    /// Period labelling.
    pub labels: LabelThresholds,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            conditioning: Conditioning::Center,
            filter: Some(LowPassFilter::default()),
            spectrum: SpectrumConfig::default(),
            selection: PeakSelector::default(),
            fusion: FusionConfig::default(),
            labels: LabelThresholds::default(),
        }
    }
}

impl SpectralConfig {
    /// Business-day samples with periods reported in calendar days, spectra
    /// truncated at three years and peaks split at 45 days.
    pub fn calendar_days() -> Self {
        Self {
            spectrum: SpectrumConfig::default()
                .with_period_scale(7.0 / 5.0)
                .with_max_span(Some(3.0 * 365.0)),
            selection: PeakSelector::default().with_bands(BandLayout::Split {
                threshold: 45.0,
                short_target: 4,
                long_target: 5,
            }),
            ..Self::default()
        }
    }

    /// Business-day samples with periods reported in business days,
    /// truncated at three years of trading days and split at 29 days.
    pub fn business_days() -> Self {
        Self {
            spectrum: SpectrumConfig::default().with_max_span(Some(3.0 * 261.0)),
            selection: PeakSelector::default().with_bands(BandLayout::Split {
                threshold: 29.0,
                short_target: 5,
                long_target: 5,
            }),
            ..Self::default()
        }
    }

    pub fn with_conditioning(mut self, conditioning: Conditioning) -> Self {
        self.conditioning = conditioning;
        self
    }

    pub fn with_filter(mut self, filter: LowPassFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn without_filter(mut self) -> Self {
        self.filter = None;
        self
    }

    pub fn with_spectrum(mut self, spectrum: SpectrumConfig) -> Self {
        self.spectrum = spectrum;
        self
    }

    pub fn with_selection(mut self, selection: PeakSelector) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_fusion(mut self, fusion: FusionConfig) -> Self {
        self.fusion = fusion;
        self
    }

    pub fn with_labels(mut self, labels: LabelThresholds) -> Self {
        self.labels = labels;
        self
    }

    /// Check every nested setting.
    pub fn validate(&self) -> Result<()> {
        if let Some(filter) = &self.filter {
            filter.validate()?;
        }
        self.spectrum.validate()?;
        self.selection.validate()?;
        self.fusion.validate()?;
        self.labels.validate()
    }
}
