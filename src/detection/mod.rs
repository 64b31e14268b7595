//! Spectral detection stages.
//!
//! This module provides:
//! - One-sided magnitude spectra with the period/edge/span policy
//! - Band-aware peak extraction with minimum separation
//! - Fusion of spectra computed at several sampling resolutions

mod fft;
mod fusion;
mod peaks;

pub use fft::{
    fft_complex, fft_frequencies, magnitude_spectrum, one_sided_spectrum, Normalization,
    SpectralWindow, Spectrum, SpectrumConfig,
};
pub use fusion::{
    average_session_spectrum, fuse, fuse_spectra, standard_tiers, tier_spectrum, FusedPeak,
    FusionConfig, FusionResult, Tier, MINUTES_PER_SESSION,
};
pub use peaks::{
    greedy_select, local_maxima, peaks_above, Band, BandLayout, BandRange, Peak, PeakSelector,
};
