//! # prism-spectral
//!
//! Spectral periodicity analysis for market-volume series.
//!
//! Conditions a sampled series, low-passes it with an adaptive zero-phase
//! FIR filter, takes its one-sided DFT magnitude spectrum and picks the
//! dominant cycles per period band. Spectra taken at several sampling
//! resolutions can be fused into one peak search.

#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod detection;
pub mod engine;
pub mod error;
pub mod filter;
pub mod labels;
pub mod provider;
pub mod transform;
pub mod utils;

pub use config::SpectralConfig;
pub use engine::{SpectralAnalysis, SpectralEngine};
pub use error::{ErrorKind, Result, SpectralError};

pub mod prelude {
    pub use crate::config::SpectralConfig;
    pub use crate::core::{Resolution, SampleSeries};
    pub use crate::detection::{
        BandLayout, FusionConfig, FusionResult, Peak, PeakSelector, Spectrum, SpectrumConfig, Tier,
    };
    pub use crate::engine::{SpectralAnalysis, SpectralEngine};
    pub use crate::error::{ErrorKind, Result, SpectralError};
    pub use crate::filter::LowPassFilter;
    pub use crate::transform::Conditioning;
}
