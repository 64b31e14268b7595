//! Adaptive FIR low-pass filtering.
//!
//! The filter sizes itself to the series: the tap count shrinks for short
//! inputs so that the edge padding never exceeds what the series supplies,
//! and filtering runs forward and backward so features keep their position.
//!
//! # Example
//!
//! ```
//! use prism_spectral::filter::LowPassFilter;
//!
//! let series: Vec<f64> = (0..200).map(|i| (i as f64 * 0.3).sin()).collect();
//! let smoothed = LowPassFilter::new(0.25).apply(&series).unwrap();
//! assert_eq!(smoothed.len(), series.len());
//! ```

mod apply;
mod design;

pub use apply::{filtfilt, reflect_pad};
pub use design::{
    firwin_lowpass, hamming, normalized_cutoff, FilterDesign, CUTOFF_SHRINK,
    MAX_NORMALIZED_CUTOFF, MIN_FILTER_LEN, MIN_TAPS, PAD_FACTOR,
};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Result, SpectralError};

/// Zero-phase low-pass filter settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LowPassFilter {
    /// Cutoff frequency in cycles per unit time.
    pub cutoff: f64,
    /// Tap count to aim for before length adaptation.
    pub requested_taps: usize,
    /// Samples per unit time.
    pub sample_rate: f64,
}

impl Default for LowPassFilter {
    fn default() -> Self {
        Self {
            cutoff: 0.5,
            requested_taps: 101,
            sample_rate: 1.0,
        }
    }
}

impl LowPassFilter {
    /// Filter with the given cutoff and default taps and sample rate.
    pub fn new(cutoff: f64) -> Self {
        Self {
            cutoff,
            ..Self::default()
        }
    }

    /// Set the requested tap count.
    pub fn with_taps(mut self, taps: usize) -> Self {
        self.requested_taps = taps;
        self
    }

    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Check the settings without designing anything.
    pub fn validate(&self) -> Result<()> {
        if self.requested_taps < MIN_TAPS {
            return Err(SpectralError::InvalidParameter(format!(
                "requested taps must be at least {}, got {}",
                MIN_TAPS, self.requested_taps
            )));
        }
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(SpectralError::InvalidParameter(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if !self.cutoff.is_finite() || self.cutoff <= 0.0 {
            return Err(SpectralError::InvalidParameter(format!(
                "cutoff must be positive, got {}",
                self.cutoff
            )));
        }
        Ok(())
    }

    /// Design the filter for a series of length `n`.
    pub fn design(&self, n: usize) -> Result<FilterDesign> {
        FilterDesign::adaptive(self.requested_taps, n, self.cutoff, self.sample_rate)
    }

    /// Low-pass `data` with zero phase; the output has the input's length.
    pub fn apply(&self, data: &[f64]) -> Result<Vec<f64>> {
        let n = data.len();
        if n < MIN_FILTER_LEN {
            return Err(SpectralError::InsufficientData {
                needed: MIN_FILTER_LEN,
                got: n,
            });
        }
        if let Some(index) = data.iter().position(|x| !x.is_finite()) {
            return Err(SpectralError::NonFinite { index });
        }

        let design = self.design(n)?;
        let pad = design.pad_len();
        trace!(n, taps = design.num_taps(), pad, "applying low-pass filter");

        let padded = reflect_pad(data, pad);
        let filtered = filtfilt(design.taps(), &padded)?;
        Ok(filtered[pad..pad + n].to_vec())
    }
}
