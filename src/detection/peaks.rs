//! Spectral peak extraction.
//!
//! Reduces a magnitude spectrum to a handful of well-separated dominant
//! periods: strict local maxima are grouped into bands and each band keeps
//! its strongest candidates whose periods are further apart than a minimum
//! separation. The separation check stops adjacent DFT bins of one leaked
//! cycle from being reported as distinct cycles.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SpectralError};

use super::fft::Spectrum;

/// Half-open interval that decides band membership.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandRange {
    /// `low <= frequency < high`.
    Frequency { low: f64, high: f64 },
    /// `min <= scaled_period < max`.
    Period { min: f64, max: f64 },
}

impl BandRange {
    /// True when a bin with this frequency and scaled period belongs here.
    pub fn contains(&self, frequency: f64, scaled_period: f64) -> bool {
        match *self {
            BandRange::Frequency { low, high } => frequency >= low && frequency < high,
            BandRange::Period { min, max } => scaled_period >= min && scaled_period < max,
        }
    }

    fn bounds(&self) -> (f64, f64) {
        match *self {
            BandRange::Frequency { low, high } => (low, high),
            BandRange::Period { min, max } => (min, max),
        }
    }
}

/// A labelled selection band with its own quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Label copied onto every peak selected in this band.
    pub label: String,
    /// Membership interval.
    pub range: BandRange,
    /// Maximum number of peaks kept.
    pub target: usize,
}

impl Band {
    /// Band over `low <= frequency < high`.
    pub fn frequency(label: impl Into<String>, low: f64, high: f64, target: usize) -> Self {
        Self {
            label: label.into(),
            range: BandRange::Frequency { low, high },
            target,
        }
    }

    /// Band over `min <= scaled_period < max`.
    pub fn period(label: impl Into<String>, min: f64, max: f64, target: usize) -> Self {
        Self {
            label: label.into(),
            range: BandRange::Period { min, max },
            target,
        }
    }
}

/// How peaks are partitioned before selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandLayout {
    /// Two bands split at a scaled-period threshold: "short" below it,
    /// "long" at or above it.
    Split {
        threshold: f64,
        short_target: usize,
        long_target: usize,
    },
    /// Explicit bands; a peak goes to the first band containing it.
    Explicit(Vec<Band>),
}

impl Default for BandLayout {
    fn default() -> Self {
        BandLayout::Split {
            threshold: 45.0,
            short_target: 4,
            long_target: 5,
        }
    }
}

impl BandLayout {
    /// Concrete bands of this layout.
    pub fn bands(&self) -> Vec<Band> {
        match self {
            BandLayout::Split {
                threshold,
                short_target,
                long_target,
            } => vec![
                Band::period("short", 0.0, *threshold, *short_target),
                Band::period("long", *threshold, f64::INFINITY, *long_target),
            ],
            BandLayout::Explicit(bands) => bands.clone(),
        }
    }

    /// Upper bound on the number of selected peaks.
    pub fn total_target(&self) -> usize {
        self.bands().iter().map(|b| b.target).sum()
    }

    /// Check thresholds and band bounds.
    pub fn validate(&self) -> Result<()> {
        match self {
            BandLayout::Split { threshold, .. } => {
                if !threshold.is_finite() || *threshold <= 0.0 {
                    return Err(SpectralError::InvalidParameter(format!(
                        "band split threshold must be positive, got {}",
                        threshold
                    )));
                }
            }
            BandLayout::Explicit(bands) => {
                if bands.is_empty() {
                    return Err(SpectralError::InvalidParameter(
                        "at least one band is required".to_string(),
                    ));
                }
                for band in bands {
                    let (low, high) = band.range.bounds();
                    if low.is_nan() || high.is_nan() || low >= high {
                        return Err(SpectralError::InvalidParameter(format!(
                            "band '{}' has empty range [{}, {})",
                            band.label, low, high
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// A spectral peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Position in the spectrum the peak was taken from.
    pub index: usize,
    /// Frequency in cycles per sample.
    pub frequency: f64,
    /// Spectral magnitude.
    pub magnitude: f64,
    /// `1 / frequency`, in samples.
    pub period: f64,
    /// Period in presentation units.
    pub scaled_period: f64,
    /// Label of the band that selected the peak (empty before selection).
    pub band: String,
}

impl Peak {
    fn from_bin(spectrum: &Spectrum, index: usize) -> Self {
        Self {
            index,
            frequency: spectrum.frequencies()[index],
            magnitude: spectrum.magnitudes()[index],
            period: spectrum.period(index),
            scaled_period: spectrum.scaled_period(index),
            band: String::new(),
        }
    }
}

/// Indices of strict local maxima; the first and last samples never qualify.
///
/// # Example
/// ```
/// use prism_spectral::detection::local_maxima;
///
/// assert_eq!(local_maxima(&[0.0, 2.0, 1.0, 3.0, 3.0, 1.0, 4.0]), vec![1]);
/// ```
pub fn local_maxima(magnitudes: &[f64]) -> Vec<usize> {
    if magnitudes.len() < 3 {
        return Vec::new();
    }
    (1..magnitudes.len() - 1)
        .filter(|&i| magnitudes[i] > magnitudes[i - 1] && magnitudes[i] > magnitudes[i + 1])
        .collect()
}

/// Strict local maxima whose magnitude is at least `min_height`.
pub fn peaks_above(magnitudes: &[f64], min_height: f64) -> Vec<usize> {
    local_maxima(magnitudes)
        .into_iter()
        .filter(|&i| magnitudes[i] >= min_height)
        .collect()
}

/// Walk candidates (already in priority order) and keep each one whose
/// scaled period differs from every kept peak by more than `min_separation`,
/// stopping once `target` peaks are kept.
pub fn greedy_select(candidates: &[Peak], target: usize, min_separation: f64) -> Vec<Peak> {
    let mut selected: Vec<Peak> = Vec::with_capacity(target);
    for candidate in candidates {
        if selected.len() >= target {
            break;
        }
        let separated = selected
            .iter()
            .all(|kept| (candidate.scaled_period - kept.scaled_period).abs() > min_separation);
        if separated {
            selected.push(candidate.clone());
        }
    }
    selected
}

/// Banded, minimum-separation peak selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakSelector {
    /// Band partition and per-band quotas.
    pub bands: BandLayout,
    /// Minimum scaled-period distance between peaks of one band.
    pub min_separation: f64,
}

impl Default for PeakSelector {
    fn default() -> Self {
        Self {
            bands: BandLayout::default(),
            min_separation: 1.1,
        }
    }
}

impl PeakSelector {
    /// Selector with the given layout and separation.
    pub fn new(bands: BandLayout, min_separation: f64) -> Self {
        Self {
            bands,
            min_separation,
        }
    }

    /// Set the band layout.
    pub fn with_bands(mut self, bands: BandLayout) -> Self {
        self.bands = bands;
        self
    }

    /// Set the minimum separation.
    pub fn with_min_separation(mut self, min_separation: f64) -> Self {
        self.min_separation = min_separation;
        self
    }

    /// Check the layout and separation.
    pub fn validate(&self) -> Result<()> {
        if !self.min_separation.is_finite() || self.min_separation < 0.0 {
            return Err(SpectralError::InvalidParameter(format!(
                "minimum separation must be finite and non-negative, got {}",
                self.min_separation
            )));
        }
        self.bands.validate()
    }

    /// Every strict local maximum of the spectrum, in ascending frequency.
    pub fn candidates(&self, spectrum: &Spectrum) -> Vec<Peak> {
        local_maxima(spectrum.magnitudes())
            .into_iter()
            .map(|i| Peak::from_bin(spectrum, i))
            .collect()
    }

    /// Partition, rank and greedily thin candidate peaks.
    ///
    /// Returns at most the sum of band targets, sorted by ascending
    /// frequency. Candidates outside every band are dropped.
    pub fn select(&self, candidates: &[Peak]) -> Vec<Peak> {
        let mut ordered = candidates.to_vec();
        ordered.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        // stable, so equal magnitudes stay in ascending frequency
        ordered.sort_by(|a, b| b.magnitude.total_cmp(&a.magnitude));

        let bands = self.bands.bands();
        let mut grouped: Vec<Vec<Peak>> = vec![Vec::new(); bands.len()];
        for peak in ordered {
            if let Some(slot) = bands
                .iter()
                .position(|b| b.range.contains(peak.frequency, peak.scaled_period))
            {
                grouped[slot].push(peak);
            }
        }

        let mut selected = Vec::new();
        for (band, group) in bands.iter().zip(grouped) {
            let kept = greedy_select(&group, band.target, self.min_separation);
            debug!(
                band = %band.label,
                candidates = group.len(),
                kept = kept.len(),
                target = band.target,
                "band selection"
            );
            selected.extend(kept.into_iter().map(|mut p| {
                p.band = band.label.clone();
                p
            }));
        }

        selected.sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        selected
    }

    /// Local-maximum detection followed by [`PeakSelector::select`].
    pub fn extract(&self, spectrum: &Spectrum) -> Vec<Peak> {
        self.select(&self.candidates(spectrum))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(frequency: f64, magnitude: f64) -> Peak {
        Peak {
            index: 0,
            frequency,
            magnitude,
            period: 1.0 / frequency,
            scaled_period: 1.0 / frequency,
            band: String::new(),
        }
    }

    #[test]
    fn local_maxima_are_strict_and_interior() {
        assert_eq!(local_maxima(&[5.0, 1.0, 2.0, 1.0, 5.0]), vec![2]);
        assert_eq!(local_maxima(&[1.0, 2.0, 2.0, 1.0]), Vec::<usize>::new());
        assert!(local_maxima(&[1.0, 2.0]).is_empty());
        assert!(local_maxima(&[0.0; 10]).is_empty());
    }

    #[test]
    fn peaks_above_is_inclusive() {
        let mags = [0.0, 1.0, 0.0, 2.0, 0.0, 3.0, 0.0];
        assert_eq!(peaks_above(&mags, 2.0), vec![3, 5]);
    }

    #[test]
    fn greedy_skips_close_periods() {
        // periods 10, 10.5, 12, 20 ordered by magnitude
        let candidates = vec![
            peak(0.1, 9.0),
            peak(1.0 / 10.5, 8.0),
            peak(1.0 / 12.0, 7.0),
            peak(0.05, 6.0),
        ];
        let kept = greedy_select(&candidates, 3, 1.1);
        let periods: Vec<f64> = kept.iter().map(|p| p.scaled_period).collect();
        assert_eq!(periods.len(), 3);
        assert!((periods[0] - 10.0).abs() < 1e-9);
        assert!((periods[1] - 12.0).abs() < 1e-9);
        assert!((periods[2] - 20.0).abs() < 1e-9);
    }

    #[test]
    fn greedy_stops_at_target() {
        let candidates: Vec<Peak> = (1..10).map(|k| peak(0.01 * k as f64, 10.0 - k as f64)).collect();
        assert_eq!(greedy_select(&candidates, 2, 1.1).len(), 2);
        assert!(greedy_select(&candidates, 0, 1.1).is_empty());
    }

    #[test]
    fn split_layout_partitions_by_period() {
        let selector = PeakSelector::new(
            BandLayout::Split {
                threshold: 45.0,
                short_target: 1,
                long_target: 1,
            },
            1.1,
        );
        let candidates = vec![peak(1.0 / 7.0, 5.0), peak(1.0 / 60.0, 1.0), peak(1.0 / 30.0, 3.0)];
        let selected = selector.select(&candidates);
        assert_eq!(selected.len(), 2);
        // ascending frequency: 60-sample peak first
        assert_eq!(selected[0].band, "long");
        assert!((selected[0].scaled_period - 60.0).abs() < 1e-9);
        assert_eq!(selected[1].band, "short");
        assert!((selected[1].scaled_period - 7.0).abs() < 1e-9);
    }

    #[test]
    fn explicit_bands_drop_outsiders() {
        let selector = PeakSelector::new(
            BandLayout::Explicit(vec![Band::frequency("mid", 0.02, 0.04, 3)]),
            0.0,
        );
        let candidates = vec![peak(0.01, 5.0), peak(0.03, 1.0), peak(0.04, 2.0)];
        let selected = selector.select(&candidates);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].frequency, 0.03);
        assert_eq!(selected[0].band, "mid");
    }

    #[test]
    fn ties_prefer_lower_frequency() {
        let selector = PeakSelector::new(
            BandLayout::Explicit(vec![Band::period("all", 0.0, f64::INFINITY, 1)]),
            1.1,
        );
        let candidates = vec![peak(0.2, 3.0), peak(0.1, 3.0)];
        let selected = selector.select(&candidates);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].frequency, 0.1);
    }

    #[test]
    fn extract_reads_spectrum() {
        let spectrum = Spectrum::new(
            vec![0.01, 0.02, 0.03, 0.04, 0.05, 0.06, 0.07],
            vec![1.0, 5.0, 1.0, 1.0, 4.0, 1.0, 9.0],
        )
        .unwrap();
        let selector = PeakSelector::default();
        let selected = selector.extract(&spectrum);
        let indices: Vec<usize> = selected.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 4]);
        assert_eq!(selected[0].band, "long"); // period 50
        assert_eq!(selected[1].band, "short"); // period 20
    }

    #[test]
    fn selection_is_idempotent() {
        let selector = PeakSelector::default();
        let candidates: Vec<Peak> = (1..60)
            .map(|k| peak(k as f64 / 200.0, ((k * 37) % 23) as f64))
            .collect();
        let once = selector.select(&candidates);
        let twice = selector.select(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn validate_rejects_bad_layouts() {
        assert!(PeakSelector::default().validate().is_ok());
        assert!(PeakSelector::default().with_min_separation(-1.0).validate().is_err());
        assert!(PeakSelector::default()
            .with_bands(BandLayout::Explicit(Vec::new()))
            .validate()
            .is_err());
        assert!(PeakSelector::default()
            .with_bands(BandLayout::Explicit(vec![Band::frequency("x", 0.3, 0.1, 1)]))
            .validate()
            .is_err());
        assert!(PeakSelector::default()
            .with_bands(BandLayout::Split {
                threshold: 0.0,
                short_target: 1,
                long_target: 1
            })
            .validate()
            .is_err());
    }
}
