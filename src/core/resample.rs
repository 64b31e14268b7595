//! Calendar resampling of sample series.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

use crate::error::{Result, SpectralError};

use super::series::{Resolution, SampleSeries};

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn month_end(year: i32, month: u32) -> Result<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| SpectralError::TimestampError(format!("no month end for {}-{}", year, month)))
}

/// Last calendar date of the bucket holding `date`.
fn bucket_end(date: NaiveDate, resolution: Resolution) -> Result<NaiveDate> {
    match resolution {
        Resolution::Day => Ok(date),
        Resolution::Week => {
            Ok(date + Duration::days(6 - date.weekday().num_days_from_monday() as i64))
        }
        Resolution::Month => month_end(date.year(), date.month()),
        Resolution::Quarter => month_end(date.year(), (date.month() - 1) / 3 * 3 + 3),
        Resolution::Year => month_end(date.year(), 12),
        Resolution::Minute | Resolution::BusinessDay => Err(SpectralError::InvalidParameter(
            format!("cannot resample to {:?}", resolution),
        )),
    }
}

/// Sum values into calendar buckets.
///
/// Each bucket is stamped with its last date at midnight UTC: Sunday for
/// weeks, the final day for months, quarters and years. Buckets between the
/// first and last observation that received no samples hold `0.0`.
pub fn resample_sum(series: &SampleSeries, resolution: Resolution) -> Result<SampleSeries> {
    if matches!(resolution, Resolution::Minute | Resolution::BusinessDay) {
        return Err(SpectralError::InvalidParameter(format!(
            "cannot resample to {:?}",
            resolution
        )));
    }

    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (ts, value) in series.iter() {
        *sums.entry(bucket_end(ts.date_naive(), resolution)?).or_insert(0.0) += value;
    }

    let (first, last) = match (sums.keys().next(), sums.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Ok(SampleSeries::default()),
    };

    let mut timestamps = Vec::with_capacity(sums.len());
    let mut values = Vec::with_capacity(sums.len());
    let mut end = first;
    while end <= last {
        timestamps.push(midnight(end));
        values.push(sums.get(&end).copied().unwrap_or(0.0));
        end = match end.succ_opt() {
            Some(next) => bucket_end(next, resolution)?,
            None => break,
        };
    }
    Ok(SampleSeries::from_sorted(timestamps, values))
}

/// Reindex onto every weekday between the first and last date.
///
/// Several samples on one date collapse to the latest. Weekend samples are
/// off the grid and dropped. Weekdays without a sample repeat the most
/// recent earlier weekday value; leading weekdays with nothing to repeat are
/// omitted.
pub fn business_day_fill(series: &SampleSeries) -> SampleSeries {
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (ts, value) in series.iter() {
        daily.insert(ts.date_naive(), value);
    }
    let (first, last) = match (daily.keys().next(), daily.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return SampleSeries::default(),
    };

    let mut timestamps = Vec::new();
    let mut values = Vec::new();
    let mut carried = None;
    for date in first.iter_days().take_while(|d| *d <= last) {
        if !is_weekday(date) {
            continue;
        }
        if let Some(&v) = daily.get(&date) {
            carried = Some(v);
        }
        if let Some(v) = carried {
            timestamps.push(midnight(date));
            values.push(v);
        }
    }
    SampleSeries::from_sorted(timestamps, values)
}

/// Split intraday samples into one series per weekday calendar date, oldest
/// first. Weekend dates are dropped.
pub fn split_trading_days(series: &SampleSeries) -> Vec<SampleSeries> {
    let mut days: Vec<SampleSeries> = Vec::new();
    let mut current: Option<NaiveDate> = None;
    let mut timestamps = Vec::new();
    let mut values = Vec::new();

    for (ts, value) in series.iter() {
        let date = ts.date_naive();
        if current != Some(date) {
            if let Some(prev) = current {
                if is_weekday(prev) {
                    days.push(SampleSeries::from_sorted(
                        std::mem::take(&mut timestamps),
                        std::mem::take(&mut values),
                    ));
                }
            }
            timestamps.clear();
            values.clear();
            current = Some(date);
        }
        timestamps.push(ts);
        values.push(value);
    }
    if let Some(prev) = current {
        if is_weekday(prev) {
            days.push(SampleSeries::from_sorted(timestamps, values));
        }
    }
    days
}
