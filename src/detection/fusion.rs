//! Multi-tier spectral fusion.
//!
//! Each tier (one sampling resolution of the same instrument) runs its own
//! conditioning, optional filtering and transform. The resulting spectra are
//! concatenated as-is, without resampling onto a common axis, and peaks are
//! searched once over the concatenation against a global height threshold.
//! A tier with much larger magnitudes can therefore hide genuine peaks of
//! weaker tiers.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{resample_sum, split_trading_days, Resolution, SampleSeries};
use crate::error::{Result, SpectralError};
use crate::filter::LowPassFilter;
use crate::transform::{condition, Conditioning};

use super::fft::{magnitude_spectrum, Normalization, Spectrum, SpectrumConfig};
use super::peaks::peaks_above;

/// Minutes in a regular US equity trading session.
pub const MINUTES_PER_SESSION: f64 = 390.0;

/// One sampling resolution of the analysed series.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    /// Display label.
    pub label: String,
    /// Sampling interval of `values`.
    pub resolution: Resolution,
    /// Dense, uniformly spaced samples.
    pub values: Vec<f64>,
    /// Multiplier applied to the tier's frequency axis.
    pub frequency_scale: f64,
    /// Run the low-pass filter before the transform.
    pub filtered: bool,
}

impl Tier {
    /// Unfiltered tier with a unit frequency scale.
    pub fn new(label: impl Into<String>, resolution: Resolution, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            resolution,
            values,
            frequency_scale: 1.0,
            filtered: false,
        }
    }

    /// Set the frequency scale.
    pub fn with_frequency_scale(mut self, scale: f64) -> Self {
        self.frequency_scale = scale;
        self
    }

    /// Enable or disable low-pass filtering for this tier.
    pub fn with_filter(mut self, filtered: bool) -> Self {
        self.filtered = filtered;
        self
    }
}

/// Settings shared by every tier of a fusion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Conditioning applied to each tier.
    pub conditioning: Conditioning,
    /// Filter used by tiers that request filtering.
    pub filter: LowPassFilter,
    /// Per-tier spectrum settings.
    pub spectrum: SpectrumConfig,
    /// Peaks must reach this fraction of the global maximum magnitude.
    pub relative_height: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            conditioning: Conditioning::LogDetrend,
            filter: LowPassFilter::default(),
            spectrum: SpectrumConfig::unmasked()
                .with_normalization(Normalization::Length)
                .with_nyquist(true),
            relative_height: 0.10,
        }
    }
}

impl FusionConfig {
    /// Set the relative height threshold.
    pub fn with_relative_height(mut self, relative_height: f64) -> Self {
        self.relative_height = relative_height;
        self
    }

    /// Set the per-tier conditioning.
    pub fn with_conditioning(mut self, conditioning: Conditioning) -> Self {
        self.conditioning = conditioning;
        self
    }

    /// Set the per-tier spectrum settings.
    pub fn with_spectrum(mut self, spectrum: SpectrumConfig) -> Self {
        self.spectrum = spectrum;
        self
    }

    /// Check the threshold and nested settings.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.relative_height) {
            return Err(SpectralError::InvalidParameter(format!(
                "relative height must lie in [0, 1], got {}",
                self.relative_height
            )));
        }
        self.filter.validate()?;
        self.spectrum.validate()
    }
}

/// A peak of the concatenated spectrum, traced back to its tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedPeak {
    /// Position of the source tier.
    pub tier: usize,
    /// Label of the source tier.
    pub tier_label: String,
    /// Position inside the source tier's spectrum.
    pub bin: usize,
    /// Frequency in the tier's (scaled) units.
    pub frequency: f64,
    /// Magnitude.
    pub magnitude: f64,
    /// `1 / frequency`.
    pub period: f64,
}

/// Concatenated spectra and the peaks found across them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    /// Tier labels in input order.
    pub tier_labels: Vec<String>,
    /// Start of each tier inside the concatenated arrays.
    pub tier_offsets: Vec<usize>,
    /// Concatenated frequencies.
    pub frequencies: Vec<f64>,
    /// Concatenated magnitudes.
    pub magnitudes: Vec<f64>,
    /// Peaks in concatenation order.
    pub peaks: Vec<FusedPeak>,
}

impl FusionResult {
    /// Concatenated range covered by tier `tier`.
    pub fn tier_range(&self, tier: usize) -> std::ops::Range<usize> {
        let start = self.tier_offsets[tier];
        let end = self
            .tier_offsets
            .get(tier + 1)
            .copied()
            .unwrap_or(self.frequencies.len());
        start..end
    }
}

/// Condition, optionally filter, and transform one tier.
pub fn tier_spectrum(tier: &Tier, config: &FusionConfig) -> Result<Spectrum> {
    let conditioned = condition(&tier.values, config.conditioning)?;
    let prepared = if tier.filtered {
        config.filter.apply(&conditioned)?
    } else {
        conditioned
    };
    let spectrum = magnitude_spectrum(&prepared, &config.spectrum)?;
    debug!(tier = %tier.label, samples = tier.values.len(), bins = spectrum.len(), "tier spectrum");
    Ok(spectrum.scale_frequencies(tier.frequency_scale))
}

/// Concatenate labelled spectra and pick peaks against the global maximum.
pub fn fuse_spectra(labels: &[String], spectra: &[Spectrum], relative_height: f64) -> Result<FusionResult> {
    if spectra.is_empty() {
        return Err(SpectralError::EmptySpectrum("no tiers to fuse".to_string()));
    }
    if labels.len() != spectra.len() {
        return Err(SpectralError::DimensionMismatch {
            expected: spectra.len(),
            got: labels.len(),
        });
    }

    let mut tier_offsets = Vec::with_capacity(spectra.len());
    let mut frequencies = Vec::new();
    let mut magnitudes = Vec::new();
    for s in spectra {
        tier_offsets.push(frequencies.len());
        frequencies.extend_from_slice(s.frequencies());
        magnitudes.extend_from_slice(s.magnitudes());
    }

    let global_max = magnitudes.iter().copied().fold(0.0, f64::max);
    let min_height = global_max * relative_height;

    let peaks: Vec<FusedPeak> = peaks_above(&magnitudes, min_height)
        .into_iter()
        .map(|i| {
            let tier = tier_offsets.partition_point(|&start| start <= i) - 1;
            FusedPeak {
                tier,
                tier_label: labels[tier].clone(),
                bin: i - tier_offsets[tier],
                frequency: frequencies[i],
                magnitude: magnitudes[i],
                period: 1.0 / frequencies[i],
            }
        })
        .collect();

    debug!(
        tiers = spectra.len(),
        bins = frequencies.len(),
        global_max,
        peaks = peaks.len(),
        "fused spectra"
    );

    Ok(FusionResult {
        tier_labels: labels.to_vec(),
        tier_offsets,
        frequencies,
        magnitudes,
        peaks,
    })
}

fn tier_spectra(tiers: &[Tier], config: &FusionConfig) -> Result<Vec<Spectrum>> {
    #[cfg(feature = "parallel")]
    let iter = tiers.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = tiers.iter();
    iter.map(|t| tier_spectrum(t, config)).collect()
}

/// Run every tier's pipeline and fuse the results.
///
/// Tiers are independent and run in parallel when the `parallel` feature is
/// enabled; the output keeps input order either way.
pub fn fuse(tiers: &[Tier], config: &FusionConfig) -> Result<FusionResult> {
    let spectra = tier_spectra(tiers, config)?;
    let labels: Vec<String> = tiers.iter().map(|t| t.label.clone()).collect();
    fuse_spectra(&labels, &spectra, config.relative_height)
}

/// Tier list used for a daily volume history plus optional minute bars.
///
/// The intraday tier uses the newest weekday session with its frequency
/// expressed in cycles per session. Daily volume is summed into weekly,
/// monthly, quarterly and yearly buckets labelled WEEK, MONTH, YEAR and
/// DECADE after the horizon each one resolves.
pub fn standard_tiers(daily: &SampleSeries, intraday: Option<&SampleSeries>) -> Result<Vec<Tier>> {
    let mut tiers = Vec::with_capacity(5);

    if let Some(minutes) = intraday {
        match split_trading_days(minutes).pop() {
            Some(session) => tiers.push(
                Tier::new("DAY", Resolution::Minute, session.into_values())
                    .with_frequency_scale(MINUTES_PER_SESSION),
            ),
            None => warn!("minute bars contain no weekday session; skipping intraday tier"),
        }
    }

    for (resolution, label) in [
        (Resolution::Week, "WEEK"),
        (Resolution::Month, "MONTH"),
        (Resolution::Quarter, "YEAR"),
        (Resolution::Year, "DECADE"),
    ] {
        let bucketed = resample_sum(daily, resolution)?;
        tiers.push(Tier::new(label, resolution, bucketed.into_values()));
    }

    Ok(tiers)
}

/// Most frequent session length; ties go to the length seen first.
fn modal_length(sessions: &[SampleSeries]) -> Option<usize> {
    let mut counts: Vec<(usize, usize)> = Vec::new();
    for session in sessions {
        match counts.iter_mut().find(|(len, _)| *len == session.len()) {
            Some((_, count)) => *count += 1,
            None => counts.push((session.len(), 1)),
        }
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(usize, usize)>, (len, count)| match best {
            Some((_, top)) if top >= count => best,
            _ => Some((len, count)),
        })
        .map(|(len, _)| len)
}

/// Mean magnitude spectrum over the weekday sessions of minute bars.
///
/// Only sessions of the most common length are kept, so half days and
/// sessions with missing bars drop out. Each kept session goes through the
/// tier pipeline with its frequency axis in cycles per session.
pub fn average_session_spectrum(minutes: &SampleSeries, config: &FusionConfig) -> Result<Spectrum> {
    let sessions = split_trading_days(minutes);
    let total = sessions.len();
    let modal = modal_length(&sessions).ok_or_else(|| {
        SpectralError::EmptySpectrum("minute bars contain no weekday session".to_string())
    })?;

    let tiers: Vec<Tier> = sessions
        .into_iter()
        .filter(|s| s.len() == modal)
        .map(|s| {
            Tier::new("DAY", Resolution::Minute, s.into_values())
                .with_frequency_scale(MINUTES_PER_SESSION)
        })
        .collect();
    debug!(kept = tiers.len(), total, modal, "averaging session spectra");

    Spectrum::average(&tier_spectra(&tiers, config)?)
}
