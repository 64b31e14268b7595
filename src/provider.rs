//! Interfaces to the data source and the chart renderer.
//!
//! The crate neither fetches nor draws anything itself; applications plug
//! their market-data client and plotting backend in through these traits.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::core::{Resolution, SampleSeries};
use crate::detection::{Peak, Spectrum};

/// Source of timestamped samples for an instrument.
pub trait SampleProvider {
    type Error: std::error::Error;

    /// Samples of `instrument` in `[start, end)` at `resolution`.
    fn fetch(
        &self,
        instrument: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: Resolution,
    ) -> Result<SampleSeries, Self::Error>;
}

/// Sink that draws a spectrum and its peaks.
pub trait Renderer {
    type Error: std::error::Error;

    /// Render and return the path of the produced artifact.
    fn render(&self, title: &str, spectrum: &Spectrum, peaks: &[Peak]) -> Result<PathBuf, Self::Error>;
}
