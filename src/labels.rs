//! Human-readable period labels and reference cycles.
//!
//! # Example
//!
//! ```
//! use prism_spectral::labels::LabelThresholds;
//!
//! let label = LabelThresholds::default().label(90.0);
//! assert_eq!(label.to_string(), "90.0 d (3.0 mo)");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpectralError};

/// Coarse unit a period is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    /// Divided by [`LabelThresholds::days_per_week`].
    Weeks,
    /// Divided by [`LabelThresholds::days_per_month`].
    Months,
    /// Divided by [`LabelThresholds::days_per_year`].
    Years,
}

impl PeriodUnit {
    /// Abbreviation shown after the value, e.g. `"wks"`.
    pub fn suffix(&self) -> &'static str {
        match self {
            PeriodUnit::Weeks => "wks",
            PeriodUnit::Months => "mo",
            PeriodUnit::Years => "yrs",
        }
    }
}

/// A period in days together with its value in the chosen unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodLabel {
    /// Period in days.
    pub days: f64,
    /// Unit picked by [`LabelThresholds::classify`].
    pub unit: PeriodUnit,
    /// `days` expressed in `unit`.
    pub value: f64,
}

impl PeriodLabel {
    /// Days only, e.g. `"21.0d"`.
    pub fn compact(&self) -> String {
        compact_label(self.days)
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} d ({:.1} {})", self.days, self.value, self.unit.suffix())
    }
}

/// Unit boundaries and divisors for [`PeriodLabel`].
///
/// Periods below `weeks_below` days are shown in weeks, periods above
/// `years_above` in years, everything in between in months.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelThresholds {
    /// Periods shorter than this many days are shown in weeks.
    pub weeks_below: f64,
    /// Periods longer than this many days are shown in years.
    pub years_above: f64,
    /// Divisor for [`PeriodUnit::Weeks`].
    pub days_per_week: f64,
    /// Divisor for [`PeriodUnit::Months`].
    pub days_per_month: f64,
    /// Divisor for [`PeriodUnit::Years`].
    pub days_per_year: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            weeks_below: 30.0,
            years_above: 366.0,
            days_per_week: 7.0,
            days_per_month: 30.0,
            days_per_year: 365.0,
        }
    }
}

impl LabelThresholds {
    /// Set the weeks/months boundary in days.
    pub fn with_weeks_below(mut self, days: f64) -> Self {
        self.weeks_below = days;
        self
    }

    /// Set the months/years boundary in days.
    pub fn with_years_above(mut self, days: f64) -> Self {
        self.years_above = days;
        self
    }

    /// Check that divisors are positive and the boundaries are ordered.
    pub fn validate(&self) -> Result<()> {
        let divisors = [self.days_per_week, self.days_per_month, self.days_per_year];
        if divisors.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(SpectralError::InvalidParameter(
                "label divisors must be positive".to_string(),
            ));
        }
        if !(self.weeks_below.is_finite() && self.years_above.is_finite())
            || self.weeks_below > self.years_above
        {
            return Err(SpectralError::InvalidParameter(format!(
                "label thresholds out of order: weeks below {}, years above {}",
                self.weeks_below, self.years_above
            )));
        }
        Ok(())
    }

    /// Unit for a period of `days`. Both boundaries belong to months.
    pub fn classify(&self, days: f64) -> PeriodUnit {
        if days > self.years_above {
            PeriodUnit::Years
        } else if days >= self.weeks_below {
            PeriodUnit::Months
        } else {
            PeriodUnit::Weeks
        }
    }

    /// Classify `days` and convert it into the chosen unit.
    pub fn label(&self, days: f64) -> PeriodLabel {
        let unit = self.classify(days);
        let divisor = match unit {
            PeriodUnit::Weeks => self.days_per_week,
            PeriodUnit::Months => self.days_per_month,
            PeriodUnit::Years => self.days_per_year,
        };
        PeriodLabel {
            days,
            unit,
            value: days / divisor,
        }
    }
}

/// `"{days:.1}d"`, used where space is tight.
pub fn compact_label(days: f64) -> String {
    format!("{:.1}d", days)
}

/// Whole days for periods of a day or more, minutes below that.
pub fn intraday_label(period_days: f64) -> String {
    if period_days >= 1.0 {
        format!("{:.0} d", period_days)
    } else {
        format!("{:.0} min", period_days * 1440.0)
    }
}

/// A named calendar cycle drawn as a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceCycle {
    /// Display name, e.g. `"Quarterly"`.
    pub name: &'static str,
    /// Period in the units of the set the cycle belongs to.
    pub period: f64,
}

impl ReferenceCycle {
    const fn new(name: &'static str, period: f64) -> Self {
        Self { name, period }
    }

    /// `1 / period`.
    pub fn frequency(&self) -> f64 {
        1.0 / self.period
    }
}

/// Reference cycles in calendar days.
pub const CALENDAR_CYCLES: [ReferenceCycle; 7] = [
    ReferenceCycle::new("Daily", 1.0),
    ReferenceCycle::new("Weekly", 7.0),
    ReferenceCycle::new("Monthly", 30.0),
    ReferenceCycle::new("Quarterly", 90.0),
    ReferenceCycle::new("Semiannual", 180.0),
    ReferenceCycle::new("Yearly", 365.0),
    ReferenceCycle::new("Biyearly", 730.0),
];

/// Reference cycles in trading days, 252 to the year.
pub const BUSINESS_CYCLES: [ReferenceCycle; 5] = [
    ReferenceCycle::new("Weekly", 5.0),
    ReferenceCycle::new("Monthly", 21.0),
    ReferenceCycle::new("Quarterly", 63.0),
    ReferenceCycle::new("Semiannual", 126.0),
    ReferenceCycle::new("Yearly", 252.0),
];

/// Reference cycles in trading days, 261 weekdays to the year.
///
/// Matches a [`BusinessDay`](crate::core::Resolution::BusinessDay) series
/// filled over every weekday, holidays included.
pub const WEEKDAY_CYCLES: [ReferenceCycle; 6] = [
    ReferenceCycle::new("Weekly", 5.0),
    ReferenceCycle::new("Monthly", 21.0),
    ReferenceCycle::new("Quarterly", 65.0),
    ReferenceCycle::new("Semiannual", 130.0),
    ReferenceCycle::new("Yearly", 261.0),
    ReferenceCycle::new("Biyearly", 521.0),
];

/// Cycles whose period does not exceed `max_period`.
pub fn visible_cycles(cycles: &[ReferenceCycle], max_period: f64) -> Vec<ReferenceCycle> {
    cycles
        .iter()
        .copied()
        .filter(|c| c.period <= max_period)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unit_boundaries() {
        let t = LabelThresholds::default();
        assert_eq!(t.classify(29.9), PeriodUnit::Weeks);
        assert_eq!(t.classify(30.0), PeriodUnit::Months);
        assert_eq!(t.classify(366.0), PeriodUnit::Months);
        assert_eq!(t.classify(366.1), PeriodUnit::Years);
    }

    #[test]
    fn label_formats() {
        let t = LabelThresholds::default();
        assert_eq!(t.label(7.0).to_string(), "7.0 d (1.0 wks)");
        assert_eq!(t.label(45.0).to_string(), "45.0 d (1.5 mo)");
        assert_eq!(t.label(730.0).to_string(), "730.0 d (2.0 yrs)");
        assert_eq!(t.label(21.04).compact(), "21.0d");
        assert_relative_eq!(t.label(14.0).value, 2.0);
    }

    #[test]
    fn intraday_labels() {
        assert_eq!(intraday_label(2.0), "2 d");
        assert_eq!(intraday_label(1.0), "1 d");
        assert_eq!(intraday_label(0.5), "720 min");
        assert_eq!(intraday_label(30.0 / 1440.0), "30 min");
    }

    #[test]
    fn thresholds_must_be_ordered() {
        assert!(LabelThresholds::default().validate().is_ok());
        let bad = LabelThresholds::default().with_weeks_below(400.0);
        assert!(bad.validate().is_err());
        let zero = LabelThresholds {
            days_per_month: 0.0,
            ..LabelThresholds::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn visible_cycles_respect_limit() {
        let names: Vec<&str> = visible_cycles(&CALENDAR_CYCLES, 365.0)
            .iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Daily", "Weekly", "Monthly", "Quarterly", "Semiannual", "Yearly"]);
        assert_relative_eq!(BUSINESS_CYCLES[0].frequency(), 0.2);
    }

    #[test]
    fn weekday_cycles_reach_two_years() {
        assert!(WEEKDAY_CYCLES.windows(2).all(|w| w[0].period < w[1].period));
        let last = WEEKDAY_CYCLES[WEEKDAY_CYCLES.len() - 1];
        assert_eq!(last.name, "Biyearly");
        assert_relative_eq!(last.period, 521.0);

        let names: Vec<&str> = visible_cycles(&WEEKDAY_CYCLES, 261.0)
            .iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Weekly", "Monthly", "Quarterly", "Semiannual", "Yearly"]);
    }
}
