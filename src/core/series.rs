//! Timestamped sample series and sampling resolutions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpectralError};

/// Sampling interval of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// One-minute bars inside a trading session.
    Minute,
    /// Calendar days, weekends included.
    Day,
    /// Weekdays only; five samples span seven calendar days.
    BusinessDay,
    /// Calendar weeks ending on Sunday.
    Week,
    /// Calendar months.
    Month,
    /// Calendar quarters.
    Quarter,
    /// Calendar years.
    Year,
}

impl Resolution {
    /// Nominal length of one sample in calendar days.
    pub fn nominal_days(&self) -> f64 {
        match self {
            Resolution::Minute => 1.0 / 1440.0,
            Resolution::Day => 1.0,
            Resolution::BusinessDay => 7.0 / 5.0,
            Resolution::Week => 7.0,
            Resolution::Month => 365.25 / 12.0,
            Resolution::Quarter => 365.25 / 4.0,
            Resolution::Year => 365.25,
        }
    }

    /// Short label, e.g. `"1w"`.
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Minute => "1min",
            Resolution::Day => "1d",
            Resolution::BusinessDay => "1bd",
            Resolution::Week => "1w",
            Resolution::Month => "1mo",
            Resolution::Quarter => "1q",
            Resolution::Year => "1y",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Values paired with strictly increasing UTC timestamps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl SampleSeries {
    /// Build a series, checking lengths and timestamp order.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(SpectralError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }
        if let Some(i) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SpectralError::TimestampError(format!(
                "timestamps must be strictly increasing ({} follows {})",
                timestamps[i + 1],
                timestamps[i]
            )));
        }
        Ok(Self { timestamps, values })
    }

    /// Build from parts already known to be ordered.
    pub(super) fn from_sorted(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Self {
        debug_assert_eq!(timestamps.len(), values.len());
        Self { timestamps, values }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the series holds no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Sample timestamps, strictly increasing.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Sample values, aligned with [`SampleSeries::timestamps`].
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the series and keep only its values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Earliest timestamp, `None` when empty.
    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.first().copied()
    }

    /// Latest timestamp, `None` when empty.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Iterate `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps.iter().copied().zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn stamps(n: i64) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::days(i)).collect()
    }

    #[test]
    fn new_accepts_ordered_series() {
        let series = SampleSeries::new(stamps(3), vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.values(), &[1.0, 2.0, 3.0]);
        assert_eq!(series.first_timestamp(), Some(stamps(1)[0]));
        assert_eq!(series.iter().nth(2).map(|(_, v)| v), Some(3.0));
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let err = SampleSeries::new(stamps(3), vec![1.0]).unwrap_err();
        assert_eq!(err, SpectralError::DimensionMismatch { expected: 3, got: 1 });
    }

    #[test]
    fn new_rejects_unordered_timestamps() {
        let mut ts = stamps(3);
        ts.swap(1, 2);
        let err = SampleSeries::new(ts, vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, SpectralError::TimestampError(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn new_rejects_duplicate_timestamps() {
        let ts = vec![stamps(1)[0], stamps(1)[0]];
        assert!(SampleSeries::new(ts, vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn empty_series_is_allowed() {
        let series = SampleSeries::new(Vec::new(), Vec::new()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.last_timestamp(), None);
    }

    #[test]
    fn nominal_days() {
        assert_relative_eq!(Resolution::BusinessDay.nominal_days(), 1.4);
        assert_relative_eq!(Resolution::Month.nominal_days(), 30.4375);
        assert_relative_eq!(Resolution::Minute.nominal_days() * 1440.0, 1.0);
        assert_eq!(Resolution::Quarter.to_string(), "1q");
    }
}
